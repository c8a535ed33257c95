//! Per-frame face update: turns key presses into atlas advances and pushes the
//! resulting UV offsets to the feature's material.

use glam::Vec4;

use crate::atlas_cycle::{AtlasCycler, FaceFeature, UvOffset};
use crate::character::FaceMaterials;
use crate::config::KeyBindings;
use crate::engine::{EngineHost, MaterialHandle};
use crate::input::InputState;

pub const U_OFFSET_PARAM: &str = "UOffset";
pub const V_OFFSET_PARAM: &str = "VOffset";

/// Shader-side UV transform rows; the offset rides in `w`.
pub fn u_offset_vector(u: f32) -> Vec4 {
    Vec4::new(1.0, 0.0, 0.0, u)
}

pub fn v_offset_vector(v: f32) -> Vec4 {
    Vec4::new(0.0, 1.0, 0.0, v)
}

pub struct FaceController {
    cycler: AtlasCycler,
    bindings: KeyBindings,
    materials: FaceMaterials,
}

impl FaceController {
    pub fn new(cycler: AtlasCycler, bindings: KeyBindings, materials: FaceMaterials) -> Self {
        Self {
            cycler,
            bindings,
            materials,
        }
    }

    pub fn cycler(&self) -> &AtlasCycler {
        &self.cycler
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Run one frame. Returns the features that advanced.
    pub fn update(
        &mut self,
        input: &InputState,
        now_ms: u64,
        host: &mut impl EngineHost,
    ) -> Vec<FaceFeature> {
        let mut advanced = Vec::new();
        for feature in FaceFeature::ALL {
            if !input.is_just_pressed(self.bindings.key_for(feature)) {
                continue;
            }
            let outcome = self.cycler.try_advance(feature, now_ms);
            if !outcome.advanced() {
                log::trace!("{feature} press at {now_ms}ms debounced");
                continue;
            }
            let offset = outcome.offset();
            self.apply(feature, offset, host);
            log::debug!(
                "{feature} -> cell {} (u={:.3}, v={:.3})",
                self.cycler.index(feature),
                offset.u,
                offset.v
            );
            advanced.push(feature);
        }
        advanced
    }

    fn apply(&self, feature: FaceFeature, offset: UvOffset, host: &mut impl EngineHost) {
        let material: MaterialHandle = self.materials.get(feature);
        if self.cycler.region(feature).uses_u_offset() {
            host.set_shader_parameter(material, U_OFFSET_PARAM, u_offset_vector(offset.u));
        }
        host.set_shader_parameter(material, V_OFFSET_PARAM, v_offset_vector(offset.v));
    }
}
