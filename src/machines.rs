use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STORE_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not read or write the machine list")]
    Io(#[from] io::Error),
    #[error("machine list is not valid JSON")]
    Format(#[from] serde_json::Error),
    #[error("machine list has unsupported version {0}")]
    UnsupportedVersion(u32),
    #[error("a machine named {0:?} already exists")]
    DuplicateName(String),
}

/// One stored wake configuration. The hardware address and host are kept
/// as text; they are parsed and resolved when the machine is woken, so a
/// record that no longer parses fails at wake time instead of silently
/// disappearing from the list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,
    #[serde(default)]
    pub comment: String,
    pub hardware_addr: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "255.255.255.255".to_string()
}

fn default_port() -> u16 {
    crate::wol::DEFAULT_PORT
}

impl Machine {
    pub fn new(name: &str, hardware_addr: &str) -> Self {
        Self {
            name: name.to_string(),
            comment: String::new(),
            hardware_addr: hardware_addr.to_string(),
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    machines: Vec<Machine>,
}

/// The on-disk machine list: a versioned JSON file with one record per
/// machine, kept in insertion order.
#[derive(Debug)]
pub struct MachineStore {
    path: PathBuf,
    machines: Vec<Machine>,
}

impl MachineStore {
    /// Loads the list from `path`. A missing file is an empty list, not
    /// an error; the file appears on the first `save`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let machines = match fs::read_to_string(&path) {
            Ok(contents) => {
                let file: StoreFile = serde_json::from_str(&contents)?;
                if file.version != STORE_VERSION {
                    return Err(Error::UnsupportedVersion(file.version));
                }
                file.machines
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, machines })
    }

    pub fn save(&self) -> Result<(), Error> {
        let file = StoreFile {
            version: STORE_VERSION,
            machines: self.machines.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a machine; names are unique within the list.
    pub fn add(&mut self, machine: Machine) -> Result<(), Error> {
        if self.get(&machine.name).is_some() {
            return Err(Error::DuplicateName(machine.name));
        }
        self.machines.push(machine);
        Ok(())
    }

    /// Removes the machine with the given name, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Machine> {
        let index = self.machines.iter().position(|m| m.name == name)?;
        Some(self.machines.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.name == name)
    }

    pub fn machines(&self) -> impl Iterator<Item = &Machine> {
        self.machines.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
