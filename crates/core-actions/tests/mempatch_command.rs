//! The cross-process write verb. The happy path writes into this test
//! process's own address space, which exercises the real kernel interface
//! without needing a second process.

mod common;

use common::counting_fixture;
use core_actions::{CommandResult, dispatch};

#[cfg(target_os = "linux")]
#[test]
#[ignore = "needs process_vm_writev access; sandboxes commonly deny it"]
fn mempatch_writes_into_a_live_process() {
    let mut fx = counting_fixture(64);
    let mut target = vec![0u8; 4];
    let line = format!(
        "mempatch {} 0x{:x} 41 42 43",
        std::process::id(),
        target.as_mut_ptr() as usize
    );
    let d = dispatch(&line, &mut fx.workbench);
    assert_eq!(d.result, CommandResult::None);
    assert!(d.status.is_none(), "unexpected status {:?}", d.status);
    assert_eq!(target, [0x41, 0x42, 0x43, 0x00]);
}

#[cfg(target_os = "linux")]
#[test]
fn mempatch_failure_surfaces_a_status() {
    let mut fx = counting_fixture(64);
    let line = format!("mempatch {} 0x10 90", u32::MAX);
    let d = dispatch(&line, &mut fx.workbench);
    assert_eq!(d.result, CommandResult::None);
    assert!(d.status.is_some());
}

#[test]
fn mempatch_rejects_malformed_arguments() {
    let mut fx = counting_fixture(64);
    let d = dispatch("mempatch notapid 0x10 90", &mut fx.workbench);
    assert_eq!(d.result, CommandResult::None);
    assert!(d.status.unwrap().contains("bad pid"));

    let d = dispatch("mempatch 1234 nowhere 90", &mut fx.workbench);
    assert!(d.status.unwrap().contains("bad address"));

    let d = dispatch("mempatch 1234 0x10 90 ??", &mut fx.workbench);
    assert!(d.status.unwrap().contains("wildcards"));
}
