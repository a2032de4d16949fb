//! Per-session I/O thread that reads PTY output and reports it to the core.
//!
//! Each session gets its own dedicated OS thread because PTY reads are
//! blocking. The thread owns the reader outright, so a blocked read never
//! holds a lock that input or resize needs.

use std::io::{ErrorKind, Read};

use geminal_core::SessionEvents;

/// Start the read loop for a session on a dedicated OS thread.
pub fn start_io_thread(events: SessionEvents, reader: Box<dyn Read + Send>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name(format!("pty-io-{}", events.window()))
        .spawn(move || io_loop(events, reader))?;
    Ok(())
}

fn io_loop(events: SessionEvents, mut reader: Box<dyn Read + Send>) {
    let mut buf = [0u8; 65536];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break, // EOF — PTY closed
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => break, // EIO once the child is gone
        };

        if !events.data(buf[..n].to_vec()) {
            // Nobody is listening any more.
            return;
        }
    }

    log::debug!("window {}: PTY output reached end of stream", events.window());
    events.exit();
}
