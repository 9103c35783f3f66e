//! Tests for autograd operations with gradient checking

mod prop_basic;
mod test_utils;
