pub mod celebrations;
