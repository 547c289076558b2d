pub mod click;
pub mod redirect;
pub mod targeting_rule;
