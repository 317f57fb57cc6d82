//! rv-protocol: Rendezvous header protocol for rv
//!
//! Every connection to the broker starts with a single newline-terminated
//! header line naming its role and node identifier. The broker answers with
//! one reply line, after which the connection carries opaque relayed bytes.

pub mod error;
pub mod header;
pub mod line;
pub mod node;
pub mod reply;

pub use error::ProtocolError;
pub use header::{Header, Role};
pub use line::{read_line, MAX_HEADER_LEN};
pub use node::NodeId;
pub use reply::Reply;
