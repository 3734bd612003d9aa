//! Module identification through the M-Module ID PROM.

use log::{debug, warn};

use crate::error::Error;
use crate::interface::ModuleInterface;

/// Magic word found at the start of every M-Module ID PROM.
pub const ID_MAGIC: u16 = 0x5346;

pub const M31_ID: u16 = 31;
pub const M32_ID: u16 = 32;
pub const M82_ID: u16 = 82;

/// The members of the module family this driver serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// 16 binary inputs.
    M31,
    /// 16 binary inputs, electrically different input stage.
    M32,
    /// 16 binary inputs with selectable input hysteresis per channel.
    M82,
}

impl Variant {
    /// Look up the variant for a module id read from the ID PROM.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            M31_ID => Some(Variant::M31),
            M32_ID => Some(Variant::M32),
            M82_ID => Some(Variant::M82),
            _ => None,
        }
    }

    /// The module id as stored in the ID PROM.
    pub fn id(self) -> u16 {
        match self {
            Variant::M31 => M31_ID,
            Variant::M32 => M32_ID,
            Variant::M82 => M82_ID,
        }
    }

    pub fn has_hysteresis(self) -> bool {
        self == Variant::M82
    }
}

/// Read the magic and id words from the ID PROM and resolve the module variant. Anything other
/// than a known module is fatal for the open.
pub(crate) fn identify<MI: ModuleInterface>(iface: &mut MI) -> Result<Variant, Error<MI::Error>> {
    let magic = iface.read_id_word(0).map_err(Error::Interface)?;
    let id = iface.read_id_word(1).map_err(Error::Interface)?;
    if magic != ID_MAGIC {
        warn!("illegal ID PROM magic 0x{:04x}", magic);
        return Err(Error::HardwareIdentityMismatch { magic, id });
    }
    match Variant::from_id(id) {
        Some(variant) => {
            debug!("M{} module detected", id);
            Ok(variant)
        }
        None => {
            warn!("illegal module id {}", id);
            Err(Error::HardwareIdentityMismatch { magic, id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::TestSpyInterface;

    #[test]
    fn identify_known_modules() {
        for &(id, variant) in &[
            (31, Variant::M31),
            (32, Variant::M32),
            (82, Variant::M82),
        ] {
            let mut ei = TestSpyInterface::new(id);
            assert_eq!(identify(&mut ei), Ok(variant));
        }
    }

    #[test]
    fn identify_bad_magic() {
        let mut ei = TestSpyInterface::new(M31_ID);
        ei.set_id_word(0, 0x1234);
        assert_eq!(
            identify(&mut ei),
            Err(Error::HardwareIdentityMismatch {
                magic: 0x1234,
                id: 31
            })
        );
    }

    #[test]
    fn identify_unknown_id() {
        let mut ei = TestSpyInterface::new(33);
        assert_eq!(
            identify(&mut ei),
            Err(Error::HardwareIdentityMismatch {
                magic: ID_MAGIC,
                id: 33
            })
        );
    }

    #[test]
    fn only_m82_has_hysteresis() {
        assert!(!Variant::M31.has_hysteresis());
        assert!(!Variant::M32.has_hysteresis());
        assert!(Variant::M82.has_hysteresis());
        assert_eq!(Variant::from_id(Variant::M82.id()), Some(Variant::M82));
    }
}
