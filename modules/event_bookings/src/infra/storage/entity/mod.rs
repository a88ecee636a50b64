pub mod events;
pub mod guests;
pub mod services;
pub mod users;
pub mod vendor_bookings;
pub mod vendor_profiles;
