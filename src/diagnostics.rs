use crate::config::Config;

pub fn check(cfg: &Config) -> anyhow::Result<()> {
    let mut errors: Vec<String> = Vec::new();
    let device = cfg.device.display();

    // Check 1: device node exists
    if !cfg.device.exists() {
        errors.push(format!(
            "{device} does not exist\n  \
             → is the sensor plugged in? list candidates with: ls /sys/class/hidraw\n  \
             → pass the right node with --device /dev/hidrawN"
        ));
    } else {
        // Check 2: device node readable and writable
        match std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&cfg.device)
        {
            Ok(_) => {}
            Err(e) => errors.push(format!(
                "cannot open {device} for read/write: {e}\n  \
                 → install a udev rule granting access, e.g.\n    \
                 SUBSYSTEM==\"hidraw\", ATTRS{{idVendor}}==\"04d9\", ATTRS{{idProduct}}==\"a052\", MODE=\"0660\", GROUP=\"plugdev\"\n  \
                 → and add yourself to that group: sudo usermod -aG plugdev $USER"
            )),
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    for err in &errors {
        eprintln!("ERROR: {err}");
    }
    anyhow::bail!("{} preflight check(s) failed", errors.len());
}
