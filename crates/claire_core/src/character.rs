//! Character setup: model, per-feature face materials and idle animation.
//!
//! The face shares one material resource, but each feature needs its own UV
//! offset, so the material is cloned once per feature before being assigned to
//! the model's slots.

use serde::Deserialize;

use crate::atlas_cycle::FaceFeature;
use crate::config::KeyBindings;
use crate::engine::{EngineHost, MaterialHandle, ModelHandle};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CharacterRig {
    pub model: String,
    pub face_material: String,
    pub body_material: String,
    pub idle_animation: String,
    pub eyebrows_slot: u32,
    pub eyes_slot: u32,
    pub mouth_slot: u32,
    pub body_slot: u32,
    pub cast_shadows: bool,
}

impl Default for CharacterRig {
    fn default() -> Self {
        Self {
            model: "Claire/Claire.mdl".to_string(),
            face_material: "Claire/Materials/JoinedMaterial.xml".to_string(),
            body_material: "Claire/Materials/Girl01_Body_MAT.xml".to_string(),
            idle_animation: "Claire/Claire_Idle.ani".to_string(),
            eyebrows_slot: 0,
            eyes_slot: 1,
            mouth_slot: 2,
            body_slot: 3,
            cast_shadows: true,
        }
    }
}

impl CharacterRig {
    pub fn slot_for(&self, feature: FaceFeature) -> u32 {
        match feature {
            FaceFeature::Eyes => self.eyes_slot,
            FaceFeature::Eyebrows => self.eyebrows_slot,
            FaceFeature::Mouth => self.mouth_slot,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("model", &self.model),
            ("face_material", &self.face_material),
            ("body_material", &self.body_material),
            ("idle_animation", &self.idle_animation),
        ] {
            if value.is_empty() {
                return Err(format!("Character validation failed: {field} is empty"));
            }
        }

        let slots = [
            self.eyebrows_slot,
            self.eyes_slot,
            self.mouth_slot,
            self.body_slot,
        ];
        for (i, slot) in slots.iter().enumerate() {
            if slots[..i].contains(slot) {
                return Err(format!(
                    "Character validation failed: material slot {slot} is assigned twice"
                ));
            }
        }
        Ok(())
    }
}

/// The cloned material driving each facial feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMaterials {
    pub eyes: MaterialHandle,
    pub eyebrows: MaterialHandle,
    pub mouth: MaterialHandle,
}

impl FaceMaterials {
    pub fn get(&self, feature: FaceFeature) -> MaterialHandle {
        match feature {
            FaceFeature::Eyes => self.eyes,
            FaceFeature::Eyebrows => self.eyebrows,
            FaceFeature::Mouth => self.mouth,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnedCharacter {
    pub model: ModelHandle,
    pub face: FaceMaterials,
}

pub fn spawn_character(
    host: &mut impl EngineHost,
    rig: &CharacterRig,
) -> Result<SpawnedCharacter, String> {
    let model = host.load_model(&rig.model)?;
    let face_source = host.load_material(&rig.face_material)?;
    let face = FaceMaterials {
        eyes: host.clone_material(face_source),
        eyebrows: host.clone_material(face_source),
        mouth: host.clone_material(face_source),
    };
    for feature in FaceFeature::ALL {
        host.set_material(model, rig.slot_for(feature), face.get(feature));
    }
    let body = host.load_material(&rig.body_material)?;
    host.set_material(model, rig.body_slot, body);
    host.set_cast_shadows(model, rig.cast_shadows);
    host.play_animation(model, &rig.idle_animation, true)?;

    log::info!(
        "Spawned character '{}' with idle animation '{}'",
        rig.model,
        rig.idle_animation
    );
    Ok(SpawnedCharacter { model, face })
}

/// On-screen help, e.g. `W=eyes, E=eyebrows, R=mouth`.
pub fn instructions_text(bindings: &KeyBindings) -> String {
    FaceFeature::ALL
        .iter()
        .map(|&feature| format!("{}={}", bindings.key_for(feature), feature))
        .collect::<Vec<_>>()
        .join(", ")
}
