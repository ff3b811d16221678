use heapless::Vec;
use serde::{Deserialize, Serialize};

pub const FRAME_DLC: usize = 8;

/// Payload bytes of one CAN frame, bounded at the classical 8-byte DLC.
pub type FrameData = Vec<u8, FRAME_DLC>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    EngineSpeed,
    VehicleSpeed,
    CoolantTemp,
    FuelLevel,
    BatteryVoltage,
}

/// Static description of one bus signal: value bounds, per-tick step
/// bounds, the offset applied before byte encoding, and the value a
/// fresh node starts from.
#[derive(Debug, Clone, Copy)]
pub struct SignalSpec {
    pub min: i32,
    pub max: i32,
    pub step_down: i32,
    pub step_up: i32,
    pub encode_offset: i32,
    pub initial: i32,
}

const ENGINE_SPEED_SPEC: SignalSpec = SignalSpec {
    min: 800,
    max: 6000,
    step_down: -200,
    step_up: 200,
    encode_offset: 0,
    initial: 1500,
};

const VEHICLE_SPEED_SPEC: SignalSpec = SignalSpec {
    min: 0,
    max: 180,
    step_down: -5,
    step_up: 5,
    encode_offset: 0,
    initial: 0,
};

// Encoded with the OBD-style +40 bias so sub-zero temperatures fit a byte.
const COOLANT_TEMP_SPEC: SignalSpec = SignalSpec {
    min: 60,
    max: 120,
    step_down: -2,
    step_up: 2,
    encode_offset: 40,
    initial: 85,
};

// Drains only; the tank is never refilled while the node runs.
const FUEL_LEVEL_SPEC: SignalSpec = SignalSpec {
    min: 20,
    max: 255,
    step_down: -1,
    step_up: 0,
    encode_offset: 0,
    initial: 180,
};

const BATTERY_VOLTAGE_SPEC: SignalSpec = SignalSpec {
    min: 120,
    max: 145,
    step_down: -2,
    step_up: 2,
    encode_offset: 0,
    initial: 128,
};

impl SignalKind {
    pub const COUNT: usize = 5;

    /// Fixed per-cycle emission order.
    pub const ALL: [SignalKind; Self::COUNT] = [
        SignalKind::EngineSpeed,
        SignalKind::VehicleSpeed,
        SignalKind::CoolantTemp,
        SignalKind::FuelLevel,
        SignalKind::BatteryVoltage,
    ];

    pub fn can_id(self) -> u16 {
        match self {
            SignalKind::EngineSpeed => 0x100,
            SignalKind::VehicleSpeed => 0x200,
            SignalKind::CoolantTemp => 0x300,
            SignalKind::FuelLevel => 0x400,
            SignalKind::BatteryVoltage => 0x500,
        }
    }

    pub fn from_can_id(can_id: u16) -> Option<Self> {
        match can_id {
            0x100 => Some(SignalKind::EngineSpeed),
            0x200 => Some(SignalKind::VehicleSpeed),
            0x300 => Some(SignalKind::CoolantTemp),
            0x400 => Some(SignalKind::FuelLevel),
            0x500 => Some(SignalKind::BatteryVoltage),
            _ => None,
        }
    }

    pub fn spec(self) -> &'static SignalSpec {
        match self {
            SignalKind::EngineSpeed => &ENGINE_SPEED_SPEC,
            SignalKind::VehicleSpeed => &VEHICLE_SPEED_SPEC,
            SignalKind::CoolantTemp => &COOLANT_TEMP_SPEC,
            SignalKind::FuelLevel => &FUEL_LEVEL_SPEC,
            SignalKind::BatteryVoltage => &BATTERY_VOLTAGE_SPEC,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SignalKind::EngineSpeed => "engine_speed",
            SignalKind::VehicleSpeed => "vehicle_speed",
            SignalKind::CoolantTemp => "coolant_temp",
            SignalKind::FuelLevel => "fuel_level",
            SignalKind::BatteryVoltage => "battery_voltage",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SignalKind::EngineSpeed => "rpm",
            SignalKind::VehicleSpeed => "km/h",
            SignalKind::CoolantTemp => "degC",
            SignalKind::FuelLevel => "/255",
            SignalKind::BatteryVoltage => "dV",
        }
    }

    /// Applies a perturbation to `value`, saturating at the signal's
    /// declared bounds.
    pub fn apply_step(self, value: i32, delta: i32) -> i32 {
        let spec = self.spec();
        (value + delta).clamp(spec.min, spec.max)
    }

    /// Encodes a clamped value into the 8-byte payload layout. Engine
    /// speed takes the first two bytes big-endian; every other signal
    /// is a single byte (after its encode offset). Trailing bytes are
    /// zero.
    pub fn encode(self, value: i32) -> FrameData {
        let mut bytes = [0u8; FRAME_DLC];
        match self {
            SignalKind::EngineSpeed => {
                bytes[..2].copy_from_slice(&(value as u16).to_be_bytes());
            }
            _ => {
                bytes[0] = (value + self.spec().encode_offset) as u8;
            }
        }
        FrameData::from_slice(&bytes).unwrap_or_default()
    }

    /// Inverse of `encode`; `None` when the payload is too short for
    /// this signal's layout.
    pub fn decode(self, data: &[u8]) -> Option<i32> {
        match self {
            SignalKind::EngineSpeed => {
                let raw: [u8; 2] = data.get(..2)?.try_into().ok()?;
                Some(i32::from(u16::from_be_bytes(raw)))
            }
            _ => {
                let raw = i32::from(*data.first()?);
                Some(raw - self.spec().encode_offset)
            }
        }
    }
}
