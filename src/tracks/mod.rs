pub(crate) mod load;
pub(crate) mod point;
pub(crate) mod table;
