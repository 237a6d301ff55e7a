//! Built-in deployment compatibility checks
//!
//! | code  | check                        | severity |
//! |-------|------------------------------|----------|
//! | PW001 | [`PrivilegedMode`]           | WARNING  |
//! | PW002 | [`DangerousCapabilities`]    | WARNING  |
//! | PW003 | [`MissingPorts`]             | WARNING  |
//! | PW004 | [`UnsupportedVolumeType`]    | ERROR    |
//! | PW005 | [`ServiceNameRfc1123`]       | WARNING  |
//! | PW006 | [`ImageVersionPinned`]       | WARNING  |

mod images;
mod naming;
mod networking;
mod security;
mod storage;

pub use images::ImageVersionPinned;
pub use naming::{is_rfc1123, to_rfc1123, ServiceNameRfc1123};
pub use networking::MissingPorts;
pub use security::{DangerousCapabilities, PrivilegedMode, DANGEROUS_CAPABILITIES};
pub use storage::UnsupportedVolumeType;

use crate::check::Check;

/// Every built-in check, boxed for the registry.
pub fn builtin() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(PrivilegedMode),
        Box::new(DangerousCapabilities),
        Box::new(MissingPorts),
        Box::new(UnsupportedVolumeType),
        Box::new(ServiceNameRfc1123),
        Box::new(ImageVersionPinned),
    ]
}
