//! Wire formats spoken by camscout.
//!
//! * [`wsdiscovery`]: the multicast Probe and the ProbeMatch responses.
//! * [`soap`]: SOAP 1.2 envelopes and WS-Security UsernameToken headers.
//! * [`onvif`]: device and media service request bodies and response extraction.
//! * [`xml`]: namespace-agnostic element lookup shared by the above.

pub mod onvif;
pub mod soap;
pub mod wsdiscovery;
pub mod xml;
