pub(crate) mod connections;
pub(crate) mod data;
pub(crate) mod management;
pub(crate) mod system;
pub(crate) mod vaults;
