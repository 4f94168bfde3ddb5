//! Unit test suite for vm_core

mod test_safepoint;
