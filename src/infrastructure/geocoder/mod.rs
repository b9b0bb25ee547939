//! External geocoder implementations

mod nominatim;

pub use nominatim::{
    NominatimClient, NominatimConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
