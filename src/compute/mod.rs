pub mod ib;
pub mod interp;
pub mod time;
