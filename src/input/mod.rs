pub mod event;
pub mod multiplexer;
pub mod source;
pub mod state;
pub mod translator;

#[cfg(test)]
mod multiplexer_test;
#[cfg(test)]
mod translator_test;
