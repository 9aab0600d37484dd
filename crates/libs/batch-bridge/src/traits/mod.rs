mod dispatch;
mod events;
mod inbox;

pub use dispatch::NativeBridge;
pub use events::BridgeEvents;
pub use inbox::InboxSource;

/// Composite trait encompassing every native-runtime capability.
///
/// Automatically implemented for any type that implements the three
/// sub-traits. The client core is generic over `B: Bridge`.
pub trait Bridge: NativeBridge + InboxSource + BridgeEvents {}

impl<T> Bridge for T where T: NativeBridge + InboxSource + BridgeEvents {}
