mod bands;
mod common;
mod decision;
