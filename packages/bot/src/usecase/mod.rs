//! UseCase layer: the rules of the room lifecycle and the room controls.

pub mod collector;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod list_rooms;
pub mod operator_log;
#[cfg(test)]
pub(crate) mod testing;

pub use collector::{CollectScope, CollectedInput, InputCollector};
pub use control::{ControlRequest, ControlRoomUseCase};
pub use dispatch::DispatchControlUseCase;
pub use error::{ControlError, CreateRoomError};
pub use lifecycle::{LifecycleReport, ManageLifecycleUseCase};
pub use list_rooms::ListRoomsUseCase;
pub use operator_log::OperatorLog;
