#[cfg(test)]
mod sink;
