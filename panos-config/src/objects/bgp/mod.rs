//! BGP on a virtual router: the protocol singleton, peer groups, peers and
//! export policy.

mod config;
mod export;
mod peer;
mod peer_group;

pub use config::{BgpConfig, DEFAULT_LOCAL_PREFERENCE, DEFAULT_RESTART_TIME};
pub use export::{CommunityAction, Export, ACTION_ALLOW, ACTION_DENY};
pub use peer::{Peer, DEFAULT_HOLD_TIME, DEFAULT_IDLE_HOLD_TIME, DEFAULT_KEEP_ALIVE_INTERVAL};
pub use peer_group::{PeerGroup, TYPE_EBGP, TYPE_EBGP_CONFED, TYPE_IBGP, TYPE_IBGP_CONFED};
