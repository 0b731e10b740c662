pub mod assessment;
pub mod enums;
pub mod message;
pub mod patient;
pub mod reference;
pub mod session;
pub mod user;

pub use assessment::*;
pub use enums::*;
pub use message::*;
pub use patient::*;
pub use reference::*;
pub use session::*;
pub use user::*;
