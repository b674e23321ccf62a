// ABOUTME: Compile-fail test verifying StackId and VersionId are not interchangeable.
// ABOUTME: This test should fail to compile, validating type safety.

use conveyor::types::{StackId, VersionId};

fn takes_stack_id(_id: StackId) {}

fn main() {
    let version_id = VersionId::new("3HL4kqtJlcpXroDTDmJ");
    takes_stack_id(version_id); // ERROR: expected StackId, found VersionId
}
