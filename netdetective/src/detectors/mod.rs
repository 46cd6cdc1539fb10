pub mod absolute_gap;
pub mod cyclic_gap;
pub mod entity;
pub mod sources;
pub mod spikes;
