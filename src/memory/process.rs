// Tue Feb 03 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange, MemoryReader, MemoryRegion, Protection};
use libc::pid_t;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::os::unix::fs::FileExt;
use std::path::Path;

/// Live-process layer backed by Linux procfs.
///
/// Regions come from `/proc/<pid>/maps` in file order; bytes come from
/// positioned reads on `/proc/<pid>/mem`.
pub struct ProcessMemory {
    pid: pid_t,
    mem: File,
    layer_name: String,
}

impl ProcessMemory {
    pub fn attach(pid: pid_t) -> Result<Self, MemoryError> {
        let mem_path = format!("/proc/{}/mem", pid);
        let mem = File::open(&mem_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MemoryError::ProcessNotFound(format!("pid {}", pid)),
            ErrorKind::PermissionDenied => MemoryError::PermissionDenied(format!(
                "cannot open {} (root privileges may be required)",
                mem_path
            )),
            _ => MemoryError::Io(e),
        })?;

        let comm = fs::read_to_string(format!("/proc/{}/comm", pid))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| format!("pid_{}", pid));

        Ok(Self {
            pid,
            mem,
            layer_name: format!("{}:{}", pid, comm),
        })
    }

    pub fn pid(&self) -> pid_t {
        self.pid
    }

    pub fn enumerate_regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
        let maps = fs::read_to_string(format!("/proc/{}/maps", self.pid))?;
        let mut regions = Vec::new();
        for line in maps.lines() {
            match parse_maps_line(line) {
                Some(region) => regions.push(region),
                None => {
                    return Err(MemoryError::InvalidMaps(line.to_string()));
                }
            }
        }
        Ok(regions)
    }

    pub fn read_memory(&self, address: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
        let mut buffer = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = self
                .mem
                .read_at(&mut buffer[filled..], address + filled as u64)
                .map_err(|_| MemoryError::ReadFailed(address))?;
            if n == 0 {
                return Err(MemoryError::ReadFailed(address));
            }
            filled += n;
        }
        Ok(buffer)
    }
}

impl MemoryReader for ProcessMemory {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        self.read_memory(addr.as_u64(), len)
    }

    fn get_regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
        self.enumerate_regions()
    }

    fn layer_name(&self) -> &str {
        &self.layer_name
    }
}

/// Parse one `/proc/<pid>/maps` line into a region.
///
/// Format: `start-end perms offset dev inode [pathname]`.
pub(crate) fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let mut fields = line.split_whitespace();
    let bounds = fields.next()?;
    let perms = fields.next()?;
    let _offset = fields.next()?;
    let _dev = fields.next()?;
    let _inode = fields.next()?;
    let pathname: Vec<&str> = fields.collect();

    let (start, end) = bounds.split_once('-')?;
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;

    let name = if pathname.is_empty() {
        "[anon]".to_string()
    } else {
        pathname.join(" ")
    };

    Some(MemoryRegion::new(
        MemoryRange::new(Address::new(start), Address::new(end)),
        Protection::from_perms(perms),
        name,
    ))
}

#[derive(Debug, Clone)]
pub struct ProcessInfo {
    pub pid: pid_t,
    pub name: String,
}

/// List every process visible under /proc, ordered by pid.
pub fn list_processes() -> Result<Vec<ProcessInfo>, MemoryError> {
    let mut processes = Vec::new();
    for entry in fs::read_dir("/proc")? {
        let entry = entry?;
        let file_name = entry.file_name();
        let pid: pid_t = match file_name.to_string_lossy().parse() {
            Ok(pid) => pid,
            Err(_) => continue,
        };
        // Processes can vanish between readdir and the comm read.
        let name = match fs::read_to_string(entry.path().join("comm")) {
            Ok(comm) => comm.trim().to_string(),
            Err(_) => continue,
        };
        processes.push(ProcessInfo { pid, name });
    }
    processes.sort_by_key(|p| p.pid);
    Ok(processes)
}

/// Apply the optional pid filter; absence means "all processes".
pub fn select_processes(filter: Option<pid_t>) -> Result<Vec<ProcessInfo>, MemoryError> {
    match filter {
        Some(pid) => {
            if !Path::new(&format!("/proc/{}", pid)).exists() {
                return Err(MemoryError::ProcessNotFound(format!("pid {}", pid)));
            }
            let name = fs::read_to_string(format!("/proc/{}/comm", pid))
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|_| format!("pid_{}", pid));
            Ok(vec![ProcessInfo { pid, name }])
        }
        None => list_processes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maps_line_with_path() {
        let line = "7f1234561000-7f1234565000 r-xp 00000000 08:01 131131 /usr/lib/libc.so.6";
        let region = parse_maps_line(line).unwrap();
        assert_eq!(region.start().as_u64(), 0x7f1234561000);
        assert_eq!(region.end().as_u64(), 0x7f1234565000);
        assert_eq!(region.protection(), Protection::ReadExecute);
        assert_eq!(region.name(), "/usr/lib/libc.so.6");
    }

    #[test]
    fn test_parse_maps_line_anonymous() {
        let line = "7ffd1000-7ffd2000 rw-p 00000000 00:00 0";
        let region = parse_maps_line(line).unwrap();
        assert_eq!(region.name(), "[anon]");
        assert_eq!(region.protection(), Protection::ReadWrite);
    }

    #[test]
    fn test_parse_maps_line_space_in_path() {
        let line = "400000-401000 r--p 00000000 08:01 42 /tmp/some file";
        let region = parse_maps_line(line).unwrap();
        assert_eq!(region.name(), "/tmp/some file");
    }

    #[test]
    fn test_parse_maps_line_rejects_garbage() {
        assert!(parse_maps_line("not a maps line").is_none());
        assert!(parse_maps_line("").is_none());
    }

    #[test]
    fn test_list_processes_contains_self() {
        let procs = list_processes().unwrap();
        let me = std::process::id() as pid_t;
        assert!(procs.iter().any(|p| p.pid == me));
    }

    #[test]
    fn test_select_single_process() {
        let me = std::process::id() as pid_t;
        let selected = select_processes(Some(me)).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].pid, me);
    }

    #[test]
    fn test_select_missing_process() {
        // pid 0 never has a /proc entry.
        assert!(matches!(
            select_processes(Some(0)),
            Err(MemoryError::ProcessNotFound(_))
        ));
    }

    #[test]
    fn test_attach_and_read_own_memory() {
        let me = std::process::id() as pid_t;
        let process = ProcessMemory::attach(me).unwrap();
        let marker: [u8; 8] = *b"VADSCAN!";
        let addr = marker.as_ptr() as u64;
        let bytes = process.read_memory(addr, marker.len()).unwrap();
        assert_eq!(bytes, marker);
    }
}
