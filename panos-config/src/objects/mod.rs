//! Configuration object classes.

pub mod address;
pub mod address_group;
pub mod aggregate_ethernet;
pub mod anti_spyware;
pub mod antivirus;
pub mod bgp;
pub mod data_filtering;
pub mod decryption;
pub mod ethernet;
pub mod file_blocking;
pub mod ha;
pub mod ike_gateway;
pub mod layer3;
pub mod layer3_subinterface;
pub mod loopback;
pub mod nat_rule;
pub mod pbf;
pub mod profile_group;
pub mod security_rule;
pub mod service;
pub mod static_route;
pub mod tag;
pub mod threat;
pub mod tunnel;
pub mod url_filtering;
pub mod virtual_router;
pub mod vlan_interface;
pub mod vulnerability;
pub mod wildfire_analysis;
pub mod zone;

pub use address::Address;
pub use address_group::AddressGroup;
pub use aggregate_ethernet::AggregateEthernet;
pub use anti_spyware::AntiSpywareProfile;
pub use antivirus::AntivirusProfile;
pub use bgp::{BgpConfig, Export as BgpExport, Peer as BgpPeer, PeerGroup as BgpPeerGroup};
pub use data_filtering::DataFilteringProfile;
pub use decryption::DecryptionRule;
pub use ethernet::Ethernet;
pub use file_blocking::FileBlockingProfile;
pub use ha::HighAvailability;
pub use ike_gateway::IkeGateway;
pub use layer3_subinterface::Layer3Subinterface;
pub use loopback::Loopback;
pub use nat_rule::NatRule;
pub use pbf::PbfRule;
pub use profile_group::ProfileGroup;
pub use security_rule::SecurityRule;
pub use service::Service;
pub use static_route::StaticRoute;
pub use tag::Tag;
pub use tunnel::Tunnel;
pub use url_filtering::UrlFilteringProfile;
pub use virtual_router::VirtualRouter;
pub use vlan_interface::VlanInterface;
pub use vulnerability::VulnerabilityProfile;
pub use wildfire_analysis::WildfireAnalysisProfile;
pub use zone::Zone;
