pub mod lifecycle;
pub mod naming;
pub mod policy;
pub mod projects;
pub mod renderer;
pub mod storage;
