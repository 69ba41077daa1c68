const MB: f64 = 1024.0 * 1024.0;

/// Resident set size of this process in MB, if the platform exposes it.
#[cfg(target_os = "windows")]
pub fn current_process_rss_mb() -> Option<f64> {
    use windows_sys::Win32::System::ProcessStatus::{K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
    use windows_sys::Win32::System::Threading::GetCurrentProcess;
    unsafe {
        let handle = GetCurrentProcess();
        let mut counters: PROCESS_MEMORY_COUNTERS = std::mem::zeroed();
        let ok = K32GetProcessMemoryInfo(handle, &mut counters as *mut _ as _, std::mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32);
        if ok != 0 { Some(counters.WorkingSetSize as f64 / MB) } else { None }
    }
}

#[cfg(not(target_os = "windows"))]
pub fn current_process_rss_mb() -> Option<f64> {
    // second field of statm is resident pages
    let data = std::fs::read_to_string("/proc/self/statm").ok()?;
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 {
        return None;
    }
    let rss_pages: u64 = data.split_whitespace().nth(1)?.parse().ok()?;
    Some((rss_pages * page_size as u64) as f64 / MB)
}

/// Peak accelerator allocation in MB. The harness only runs on CPU, so this is always zero.
pub fn accelerator_peak_mb() -> f64 {
    0.0
}
