use bytemuck::{Pod, Zeroable};
use log::warn;

use crate::simulation::types::{MAX_DISPATCH_SIZE, MIN_DISPATCH_SIZE};

/// Starting distribution of the particle field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialShape {
    #[default]
    Point,
    Sphere,
    Box,
    Donut,
}

impl InitialShape {
    pub const ALL: [InitialShape; 4] = [
        InitialShape::Point,
        InitialShape::Sphere,
        InitialShape::Box,
        InitialShape::Donut,
    ];

    /// Ordinal as seen by the shaders. Also the index of the preset tuned for this shape.
    pub fn index(self) -> usize {
        match self {
            InitialShape::Point => 0,
            InitialShape::Sphere => 1,
            InitialShape::Box => 2,
            InitialShape::Donut => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            InitialShape::Point => "Point",
            InitialShape::Sphere => "Sphere",
            InitialShape::Box => "Box",
            InitialShape::Donut => "Donut",
        }
    }
}

/// Continuous fields of [`ParameterSet`] the user can edit at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarParam {
    InitialSpeed,
    #[default]
    Gravity,
    Damping,
    MaxAccel,
    TimeStep,
    ParticleIntensity,
    ParticleSize,
    ParticlePower,
}

impl ScalarParam {
    pub const ALL: [ScalarParam; 8] = [
        ScalarParam::InitialSpeed,
        ScalarParam::Gravity,
        ScalarParam::Damping,
        ScalarParam::MaxAccel,
        ScalarParam::TimeStep,
        ScalarParam::ParticleIntensity,
        ScalarParam::ParticleSize,
        ScalarParam::ParticlePower,
    ];

    // Increments per full range when nudged from the keyboard
    const STEPS: f32 = 50.0;

    pub fn name(self) -> &'static str {
        match self {
            ScalarParam::InitialSpeed => "initial speed",
            ScalarParam::Gravity => "gravity",
            ScalarParam::Damping => "damping",
            ScalarParam::MaxAccel => "max acceleration",
            ScalarParam::TimeStep => "time step",
            ScalarParam::ParticleIntensity => "intensity",
            ScalarParam::ParticleSize => "size",
            ScalarParam::ParticlePower => "power",
        }
    }

    /// Inclusive editing range as `(min, max)`.
    pub fn range(self) -> (f32, f32) {
        match self {
            ScalarParam::InitialSpeed => (0.0, 300.0),
            ScalarParam::Gravity => (0.0, 0.3),
            ScalarParam::Damping => (0.0, 1.0),
            ScalarParam::MaxAccel => (0.0, 100.0),
            ScalarParam::TimeStep => (0.0, 0.02),
            ScalarParam::ParticleIntensity => (0.0, 1.0),
            ScalarParam::ParticleSize => (0.0, 1.0),
            ScalarParam::ParticlePower => (0.001, 16.0),
        }
    }

    pub fn step(self) -> f32 {
        let (min, max) = self.range();
        (max - min) / Self::STEPS
    }

    pub fn next(self) -> Self {
        let position = Self::ALL.iter().position(|&p| p == self).unwrap_or(0);
        Self::ALL[(position + 1) % Self::ALL.len()]
    }

    pub fn get(self, params: &ParameterSet) -> f32 {
        match self {
            ScalarParam::InitialSpeed => params.initial_speed,
            ScalarParam::Gravity => params.gravity,
            ScalarParam::Damping => params.damping,
            ScalarParam::MaxAccel => params.max_accel,
            ScalarParam::TimeStep => params.time_step,
            ScalarParam::ParticleIntensity => params.particle_intensity,
            ScalarParam::ParticleSize => params.particle_size,
            ScalarParam::ParticlePower => params.particle_power,
        }
    }

    /// Writes `value` clamped to the editing range. Non-finite values are
    /// ignored; returns whether the field was written.
    pub fn set(self, params: &mut ParameterSet, value: f32) -> bool {
        if !value.is_finite() {
            warn!("Ignoring non-finite {} value {value}", self.name());
            return false;
        }
        let (min, max) = self.range();
        let value = value.clamp(min, max);
        let field = match self {
            ScalarParam::InitialSpeed => &mut params.initial_speed,
            ScalarParam::Gravity => &mut params.gravity,
            ScalarParam::Damping => &mut params.damping,
            ScalarParam::MaxAccel => &mut params.max_accel,
            ScalarParam::TimeStep => &mut params.time_step,
            ScalarParam::ParticleIntensity => &mut params.particle_intensity,
            ScalarParam::ParticleSize => &mut params.particle_size,
            ScalarParam::ParticlePower => &mut params.particle_power,
        };
        *field = value;
        true
    }
}

/// Tunable simulation parameters, uploaded to the GPU every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    pub time_step: f32,
    /// Work-group count of the update pass (1..=64).
    pub dispatch_size: i32,
    pub gravity: f32,
    pub damping: f32,
    pub particle_intensity: f32,
    pub particle_size: f32,
    pub base_seed: i32,
    pub particle_power: f32,
    pub initial_speed: f32,
    pub initial_shape: InitialShape,
    pub max_accel: f32,
}

pub const PRESET_COUNT: usize = 4;

const PRESETS: [ParameterSet; PRESET_COUNT] = [
    // Tight cluster
    ParameterSet {
        time_step: 0.0067,
        dispatch_size: 32,
        gravity: 0.069,
        damping: 0.0,
        particle_intensity: 0.35,
        particle_size: 0.925,
        base_seed: 0,
        particle_power: 5.0,
        initial_speed: 122.6,
        initial_shape: InitialShape::Point,
        max_accel: 30.0,
    },
    // Orbiting ring
    ParameterSet {
        time_step: 0.0157,
        dispatch_size: 32,
        gravity: 0.109,
        damping: 0.25,
        particle_intensity: 0.64,
        particle_size: 0.279,
        base_seed: 57,
        particle_power: 3.5,
        initial_speed: 3.2,
        initial_shape: InitialShape::Sphere,
        max_accel: 100.0,
    },
    // Explosive expansion
    ParameterSet {
        time_step: 0.02,
        dispatch_size: 32,
        gravity: 0.24,
        damping: 0.12,
        particle_intensity: 1.0,
        particle_size: 1.0,
        base_seed: 23,
        particle_power: 4.0,
        initial_speed: 31.1,
        initial_shape: InitialShape::Box,
        max_accel: 39.29,
    },
    // Damped collapse
    ParameterSet {
        time_step: 0.0118,
        dispatch_size: 32,
        gravity: 0.141,
        damping: 1.0,
        particle_intensity: 0.64,
        particle_size: 0.28,
        base_seed: 60,
        particle_power: 1.97,
        initial_speed: 69.7,
        initial_shape: InitialShape::Donut,
        max_accel: 3.21,
    },
];

/// Overwrites every field of `params` with preset `preset`.
///
/// Indices outside `0..PRESET_COUNT` leave `params` untouched and log a
/// warning. Returns whether the preset was applied.
pub fn initialize_params(preset: usize, params: &mut ParameterSet) -> bool {
    match ParameterSet::preset(preset) {
        Some(loaded) => {
            *params = loaded;
            true
        }
        None => {
            warn!("Ignoring unsupported preset index {preset}");
            false
        }
    }
}

impl ParameterSet {
    pub fn preset(index: usize) -> Option<Self> {
        PRESETS.get(index).copied()
    }

    pub fn for_shape(shape: InitialShape) -> Self {
        PRESETS[shape.index()]
    }

    /// Update work-group count, clamped to the editable range.
    pub fn clamped_dispatch_size(&self) -> u32 {
        self.dispatch_size.clamp(MIN_DISPATCH_SIZE, MAX_DISPATCH_SIZE) as u32
    }

    pub fn to_uniform(&self) -> ParamsUniform {
        ParamsUniform {
            time_step: self.time_step,
            dispatch_size: self.clamped_dispatch_size(),
            gravity: self.gravity,
            damping: self.damping,
            particle_intensity: self.particle_intensity,
            particle_size: self.particle_size,
            base_seed: self.base_seed,
            particle_power: self.particle_power,
            initial_speed: self.initial_speed,
            initial_shape: self.initial_shape.index() as u32,
            max_accel: self.max_accel,
            _padding: 0.0,
        }
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        PRESETS[0]
    }
}

// GPU-side layout of ParameterSet, three vec4s worth of scalars
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ParamsUniform {
    pub time_step: f32,
    pub dispatch_size: u32,
    pub gravity: f32,
    pub damping: f32,
    pub particle_intensity: f32,
    pub particle_size: f32,
    pub base_seed: i32,
    pub particle_power: f32,
    pub initial_speed: f32,
    pub initial_shape: u32,
    pub max_accel: f32,
    pub _padding: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_tuned_constants() {
        let mut params = ParameterSet::default();

        assert!(initialize_params(0, &mut params));
        assert_eq!(params.time_step, 0.0067);
        assert_eq!(params.dispatch_size, 32);
        assert_eq!(params.gravity, 0.069);
        assert_eq!(params.damping, 0.0);
        assert_eq!(params.particle_intensity, 0.35);
        assert_eq!(params.particle_size, 0.925);
        assert_eq!(params.base_seed, 0);
        assert_eq!(params.particle_power, 5.0);
        assert_eq!(params.initial_speed, 122.6);
        assert_eq!(params.initial_shape, InitialShape::Point);
        assert_eq!(params.max_accel, 30.0);

        assert!(initialize_params(1, &mut params));
        assert_eq!(params.time_step, 0.0157);
        assert_eq!(params.gravity, 0.109);
        assert_eq!(params.damping, 0.25);
        assert_eq!(params.particle_intensity, 0.64);
        assert_eq!(params.particle_size, 0.279);
        assert_eq!(params.base_seed, 57);
        assert_eq!(params.particle_power, 3.5);
        assert_eq!(params.initial_speed, 3.2);
        assert_eq!(params.initial_shape, InitialShape::Sphere);
        assert_eq!(params.max_accel, 100.0);

        assert!(initialize_params(2, &mut params));
        assert_eq!(params.time_step, 0.02);
        assert_eq!(params.gravity, 0.24);
        assert_eq!(params.damping, 0.12);
        assert_eq!(params.particle_intensity, 1.0);
        assert_eq!(params.particle_size, 1.0);
        assert_eq!(params.base_seed, 23);
        assert_eq!(params.particle_power, 4.0);
        assert_eq!(params.initial_speed, 31.1);
        assert_eq!(params.initial_shape, InitialShape::Box);
        assert_eq!(params.max_accel, 39.29);

        assert!(initialize_params(3, &mut params));
        assert_eq!(params.time_step, 0.0118);
        assert_eq!(params.gravity, 0.141);
        assert_eq!(params.damping, 1.0);
        assert_eq!(params.particle_intensity, 0.64);
        assert_eq!(params.particle_size, 0.28);
        assert_eq!(params.base_seed, 60);
        assert_eq!(params.particle_power, 1.97);
        assert_eq!(params.initial_speed, 69.7);
        assert_eq!(params.initial_shape, InitialShape::Donut);
        assert_eq!(params.max_accel, 3.21);
    }

    #[test]
    fn every_preset_uses_32_groups() {
        for index in 0..PRESET_COUNT {
            assert_eq!(ParameterSet::preset(index).map(|p| p.dispatch_size), Some(32));
        }
    }

    #[test]
    fn unknown_preset_is_a_no_op() {
        let mut params = ParameterSet::default();
        params.gravity = 0.2;
        params.base_seed = 99;
        let before = params;

        for index in [4, 5, 100, usize::MAX] {
            assert!(!initialize_params(index, &mut params));
            assert_eq!(params, before);
        }
    }

    #[test]
    fn preset_index_follows_shape() {
        for shape in InitialShape::ALL {
            assert_eq!(ParameterSet::for_shape(shape).initial_shape, shape);
            assert_eq!(InitialShape::from_index(shape.index()), Some(shape));
        }
        assert_eq!(InitialShape::from_index(4), None);
    }

    #[test]
    fn presets_sit_inside_editing_ranges() {
        for index in 0..PRESET_COUNT {
            let Some(preset) = ParameterSet::preset(index) else {
                panic!("preset {index} missing");
            };
            for param in ScalarParam::ALL {
                let (min, max) = param.range();
                let value = param.get(&preset);
                assert!(
                    (min..=max).contains(&value),
                    "preset {index} {} = {value}",
                    param.name()
                );
            }
        }
    }

    #[test]
    fn scalar_cycle_visits_every_field() {
        let mut param = ScalarParam::default();
        let mut seen = Vec::new();
        for _ in 0..ScalarParam::ALL.len() {
            seen.push(param);
            param = param.next();
        }
        assert_eq!(param, ScalarParam::default());
        for expected in ScalarParam::ALL {
            assert!(seen.contains(&expected));
        }
    }

    #[test]
    fn non_finite_scalar_is_ignored() {
        let mut params = ParameterSet::default();
        let before = params;
        assert!(!ScalarParam::Gravity.set(&mut params, f32::NAN));
        assert!(!ScalarParam::Damping.set(&mut params, f32::INFINITY));
        assert_eq!(params, before);
    }

    #[test]
    fn uniform_is_three_vec4s() {
        assert_eq!(std::mem::size_of::<ParamsUniform>(), 48);
    }

    #[test]
    fn uniform_clamps_dispatch_size() {
        let mut params = ParameterSet::default();
        params.dispatch_size = 500;
        assert_eq!(params.to_uniform().dispatch_size, 64);
        params.dispatch_size = -3;
        assert_eq!(params.to_uniform().dispatch_size, 1);
    }
}
