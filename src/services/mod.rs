pub mod geoip;
pub mod grant;
pub mod resolver;
pub mod targeting;
pub mod user_agent;

pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider};
pub use grant::GrantService;
pub use resolver::{Outcome, RedirectStore, Resolver, Visit};
pub use user_agent::{ClassifiedAgent, classify_user_agent};
