#[cfg(test)]
mod connection;
