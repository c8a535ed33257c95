//! Seam between the demo and the engine that owns rendering, resources,
//! animation and UI.
//!
//! Everything the demo needs from the engine goes through `EngineHost`, passed
//! in explicitly by the caller. `HeadlessHost` is an in-memory implementation
//! that records every call; the demo binary runs on it when no renderer is
//! attached, and tests assert against what it recorded.

use std::collections::HashMap;

use glam::Vec4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

pub trait EngineHost {
    fn load_model(&mut self, name: &str) -> Result<ModelHandle, String>;
    fn load_material(&mut self, name: &str) -> Result<MaterialHandle, String>;
    /// Independent copy whose shader parameters can diverge from the source.
    fn clone_material(&mut self, material: MaterialHandle) -> MaterialHandle;
    fn set_material(&mut self, model: ModelHandle, slot: u32, material: MaterialHandle);
    fn set_cast_shadows(&mut self, model: ModelHandle, enabled: bool);
    fn play_animation(&mut self, model: ModelHandle, name: &str, looping: bool)
        -> Result<(), String>;
    fn set_shader_parameter(&mut self, material: MaterialHandle, name: &str, value: Vec4);
    fn show_text(&mut self, text: &str);
}

#[derive(Debug, Clone)]
pub struct HeadlessModel {
    pub resource: String,
    pub materials: HashMap<u32, MaterialHandle>,
    pub cast_shadows: bool,
    pub animation: Option<(String, bool)>,
}

#[derive(Debug, Clone)]
pub struct HeadlessMaterial {
    pub resource: String,
    pub parameters: HashMap<String, Vec4>,
}

/// Records engine calls in memory. Resource names listed in `missing` fail to load.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    models: Vec<HeadlessModel>,
    materials: Vec<HeadlessMaterial>,
    texts: Vec<String>,
    missing: Vec<String>,
    parameter_writes: usize,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loads of `name` fail, as if the resource were absent.
    pub fn with_missing_resource(mut self, name: &str) -> Self {
        self.missing.push(name.to_string());
        self
    }

    pub fn model(&self, model: ModelHandle) -> Option<&HeadlessModel> {
        self.models.get(model.0 as usize)
    }

    pub fn material(&self, material: MaterialHandle) -> Option<&HeadlessMaterial> {
        self.materials.get(material.0 as usize)
    }

    pub fn parameter(&self, material: MaterialHandle, name: &str) -> Option<Vec4> {
        self.material(material)?.parameters.get(name).copied()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Total number of `set_shader_parameter` calls seen.
    pub fn parameter_writes(&self) -> usize {
        self.parameter_writes
    }

    fn check_present(&self, kind: &str, name: &str) -> Result<(), String> {
        if self.missing.iter().any(|m| m == name) {
            return Err(format!("Failed to load {kind} '{name}': resource not found"));
        }
        Ok(())
    }
}

impl EngineHost for HeadlessHost {
    fn load_model(&mut self, name: &str) -> Result<ModelHandle, String> {
        self.check_present("model", name)?;
        self.models.push(HeadlessModel {
            resource: name.to_string(),
            materials: HashMap::new(),
            cast_shadows: false,
            animation: None,
        });
        Ok(ModelHandle(self.models.len() as u32 - 1))
    }

    fn load_material(&mut self, name: &str) -> Result<MaterialHandle, String> {
        self.check_present("material", name)?;
        self.materials.push(HeadlessMaterial {
            resource: name.to_string(),
            parameters: HashMap::new(),
        });
        Ok(MaterialHandle(self.materials.len() as u32 - 1))
    }

    fn clone_material(&mut self, material: MaterialHandle) -> MaterialHandle {
        let copy = match self.material(material) {
            Some(source) => source.clone(),
            None => {
                log::warn!("Cloning unknown material {:?}", material);
                HeadlessMaterial {
                    resource: String::new(),
                    parameters: HashMap::new(),
                }
            }
        };
        self.materials.push(copy);
        MaterialHandle(self.materials.len() as u32 - 1)
    }

    fn set_material(&mut self, model: ModelHandle, slot: u32, material: MaterialHandle) {
        match self.models.get_mut(model.0 as usize) {
            Some(m) => {
                m.materials.insert(slot, material);
            }
            None => log::warn!("set_material on unknown model {:?}", model),
        }
    }

    fn set_cast_shadows(&mut self, model: ModelHandle, enabled: bool) {
        if let Some(m) = self.models.get_mut(model.0 as usize) {
            m.cast_shadows = enabled;
        }
    }

    fn play_animation(
        &mut self,
        model: ModelHandle,
        name: &str,
        looping: bool,
    ) -> Result<(), String> {
        self.check_present("animation", name)?;
        let m = self
            .models
            .get_mut(model.0 as usize)
            .ok_or_else(|| format!("Cannot play '{name}': unknown model {:?}", model))?;
        m.animation = Some((name.to_string(), looping));
        Ok(())
    }

    fn set_shader_parameter(&mut self, material: MaterialHandle, name: &str, value: Vec4) {
        self.parameter_writes += 1;
        match self.materials.get_mut(material.0 as usize) {
            Some(m) => {
                log::debug!("{} {} = {:?}", m.resource, name, value);
                m.parameters.insert(name.to_string(), value);
            }
            None => log::warn!("set_shader_parameter on unknown material {:?}", material),
        }
    }

    fn show_text(&mut self, text: &str) {
        log::info!("UI text: {text}");
        self.texts.push(text.to_string());
    }
}
