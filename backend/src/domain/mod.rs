//! Domain primitives, ports and services.
//!
//! Purpose: hold everything that is independent of transport and storage.
//! Inbound adapters call the driving ports in [`ports`]; outbound adapters
//! implement the driven ones.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, UserId, FriendProfile: user records and their public projection.
//! - SharedList, ListCode, Invitee, NewList: shared lists.
//! - FanOut: concurrent per-item lookups with a batch deadline.
//! - FriendGraphService, ListCodeGenerator, ListSharingService: use-cases.

pub mod error;
pub mod fan_out;
pub mod friends;
pub mod list;
pub mod list_code;
pub mod list_sharing;
pub mod optimistic;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod users;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::fan_out::{BranchOutcome, FanOut, FanOutError, FanOutReport};
pub use self::friends::FriendGraphService;
pub use self::list::{
    Invitee, LIST_CODE_LEN, ListCode, ListCodeValidationError, ListId, NewList, SharedList,
};
pub use self::list_code::{ListCodeGenerator, RngTokenSource, TokenSource};
pub use self::list_sharing::{CreatedList, FailedDelivery, ListSharingService, ShareReport};
pub use self::trace_id::TraceId;
pub use self::user::{Credentials, FriendProfile, User, UserId, UserProfile, UserValidationError};
pub use self::users::UserDirectoryService;

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";
