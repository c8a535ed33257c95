//! Debounced cycling through the cells of a facial texture atlas.
//!
//! Each facial feature (eyes, eyebrows, mouth) samples one cell of a shared
//! atlas texture. The cell is selected by a UV offset handed to the material
//! shader; advancing a feature moves it to the next cell, wrapping at
//! `index_max`.
//!
//! Grid atlases are filled column-major: cells run down a column of `rows`
//! cells, then continue at the top of the next column. Strip atlases are a
//! single vertical column and only carry a V offset.
//!
//! Advances are rate-limited by a `DebounceGate`. In `GateMode::Shared` one
//! gate guards every feature, so an accepted press on one feature suppresses
//! presses on the others for the rest of the interval. `GateMode::PerRegion`
//! gives each feature its own gate.

use serde::Deserialize;

pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Slack for float rounding when checking that the last cell fits the texture.
const UV_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceFeature {
    Eyes,
    Eyebrows,
    Mouth,
}

impl FaceFeature {
    /// All features in update order.
    pub const ALL: [FaceFeature; 3] = [
        FaceFeature::Eyes,
        FaceFeature::Eyebrows,
        FaceFeature::Mouth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Eyes => "eyes",
            Self::Eyebrows => "eyebrows",
            Self::Mouth => "mouth",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Eyes => 0,
            Self::Eyebrows => 1,
            Self::Mouth => 2,
        }
    }
}

impl std::fmt::Display for FaceFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtlasLayout {
    /// 2D grid, `rows` cells per column.
    Grid { rows: u32 },
    /// 1D vertical strip.
    Strip,
}

/// Normalized offset of the selected cell's corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvOffset {
    pub u: f32,
    pub v: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvanceOutcome {
    Advanced(UvOffset),
    /// Suppressed by the gate; carries the unchanged offset.
    Debounced(UvOffset),
}

impl AdvanceOutcome {
    pub fn offset(self) -> UvOffset {
        match self {
            Self::Advanced(offset) | Self::Debounced(offset) => offset,
        }
    }

    pub fn advanced(self) -> bool {
        matches!(self, Self::Advanced(_))
    }
}

#[derive(Debug, Clone)]
pub struct AtlasRegion {
    index: u32,
    index_max: u32,
    layout: AtlasLayout,
    cell_width: f32,
    cell_height: f32,
}

impl AtlasRegion {
    pub fn new(
        index_max: u32,
        layout: AtlasLayout,
        cell_width: f32,
        cell_height: f32,
    ) -> Result<Self, String> {
        if index_max == 0 {
            return Err("Atlas region validation failed: index_max must be > 0".to_string());
        }
        if let AtlasLayout::Grid { rows: 0 } = layout {
            return Err("Atlas region validation failed: grid rows must be > 0".to_string());
        }
        for (axis, size) in [("cell_width", cell_width), ("cell_height", cell_height)] {
            if !(size > 0.0 && size <= 1.0) {
                return Err(format!(
                    "Atlas region validation failed: {axis} {size} is outside (0, 1]"
                ));
            }
        }

        let region = Self {
            index: 0,
            index_max,
            layout,
            cell_width,
            cell_height,
        };
        let last = region.offset_of(index_max - 1);
        let max_v = match layout {
            AtlasLayout::Grid { rows } => (rows.min(index_max) - 1) as f32 * cell_height,
            AtlasLayout::Strip => last.v,
        };
        if last.u + cell_width > 1.0 + UV_EPSILON || max_v + cell_height > 1.0 + UV_EPSILON {
            return Err(format!(
                "Atlas region validation failed: {index_max} cells of {cell_width}x{cell_height} do not fit the texture"
            ));
        }
        Ok(region)
    }

    /// Column-major grid.
    pub fn grid(
        index_max: u32,
        rows: u32,
        cell_width: f32,
        cell_height: f32,
    ) -> Result<Self, String> {
        Self::new(index_max, AtlasLayout::Grid { rows }, cell_width, cell_height)
    }

    pub fn strip(index_max: u32, cell_height: f32) -> Result<Self, String> {
        Self::new(index_max, AtlasLayout::Strip, 1.0, cell_height)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn index_max(&self) -> u32 {
        self.index_max
    }

    pub fn layout(&self) -> AtlasLayout {
        self.layout
    }

    /// Strips only drive the V offset.
    pub fn uses_u_offset(&self) -> bool {
        matches!(self.layout, AtlasLayout::Grid { .. })
    }

    pub fn offset(&self) -> UvOffset {
        self.offset_of(self.index)
    }

    fn offset_of(&self, index: u32) -> UvOffset {
        match self.layout {
            AtlasLayout::Grid { rows } => {
                let row = index % rows;
                let col = index / rows;
                UvOffset {
                    u: col as f32 * self.cell_width,
                    v: row as f32 * self.cell_height,
                }
            }
            AtlasLayout::Strip => UvOffset {
                u: 0.0,
                v: index as f32 * self.cell_height,
            },
        }
    }

    /// Step to the next cell, wrapping at `index_max`.
    pub fn advance(&mut self) -> UvOffset {
        self.index = (self.index + 1) % self.index_max;
        self.offset()
    }

    /// Advance only if more than `interval_ms` passed since the last accepted
    /// trigger. Resetting the gate baseline is the caller's job.
    pub fn try_advance(&mut self, elapsed_ms: u64, interval_ms: u64) -> AdvanceOutcome {
        if elapsed_ms <= interval_ms {
            return AdvanceOutcome::Debounced(self.offset());
        }
        AdvanceOutcome::Advanced(self.advance())
    }
}

/// Minimum-interval rate limiter keyed on a millisecond baseline.
#[derive(Debug, Clone, Copy)]
pub struct DebounceGate {
    interval_ms: u64,
    baseline_ms: u64,
}

impl DebounceGate {
    /// The gate starts closed: the interval runs from `now_ms`.
    pub fn new(interval_ms: u64, now_ms: u64) -> Self {
        Self {
            interval_ms,
            baseline_ms: now_ms,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.baseline_ms)
    }

    pub fn is_open(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) > self.interval_ms
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.baseline_ms = now_ms;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// One gate for all features.
    #[default]
    Shared,
    PerRegion,
}

/// The three facial regions plus the gate(s) that rate-limit them.
#[derive(Debug, Clone)]
pub struct AtlasCycler {
    regions: [AtlasRegion; 3],
    gates: Vec<DebounceGate>,
    mode: GateMode,
}

impl AtlasCycler {
    pub fn new(
        eyes: AtlasRegion,
        eyebrows: AtlasRegion,
        mouth: AtlasRegion,
        mode: GateMode,
        interval_ms: u64,
        now_ms: u64,
    ) -> Self {
        let gate_count = match mode {
            GateMode::Shared => 1,
            GateMode::PerRegion => FaceFeature::ALL.len(),
        };
        Self {
            regions: [eyes, eyebrows, mouth],
            gates: vec![DebounceGate::new(interval_ms, now_ms); gate_count],
            mode,
        }
    }

    pub fn gate_mode(&self) -> GateMode {
        self.mode
    }

    pub fn region(&self, feature: FaceFeature) -> &AtlasRegion {
        &self.regions[feature.slot()]
    }

    pub fn index(&self, feature: FaceFeature) -> u32 {
        self.region(feature).index()
    }

    pub fn offset(&self, feature: FaceFeature) -> UvOffset {
        self.region(feature).offset()
    }

    fn gate_slot(&self, feature: FaceFeature) -> usize {
        match self.mode {
            GateMode::Shared => 0,
            GateMode::PerRegion => feature.slot(),
        }
    }

    pub fn try_advance(&mut self, feature: FaceFeature, now_ms: u64) -> AdvanceOutcome {
        let slot = self.gate_slot(feature);
        let gate = &mut self.gates[slot];
        let outcome =
            self.regions[feature.slot()].try_advance(gate.elapsed_ms(now_ms), gate.interval_ms());
        if outcome.advanced() {
            gate.reset(now_ms);
        }
        outcome
    }
}
