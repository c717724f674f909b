pub mod backend;
pub mod sim;
pub mod trace;

#[cfg(test)]
mod test;
