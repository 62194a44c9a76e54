pub mod mapping;
pub mod owner;
pub mod parcel;
pub mod shape;
