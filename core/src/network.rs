pub mod multicast;
pub mod soap;
