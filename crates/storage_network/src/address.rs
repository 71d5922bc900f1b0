//! Dynamic address allocation for nodes.

use std::{collections::BTreeMap, net::Ipv4Addr};

use crate::{error::NetworkError, node_ref::NodeId};

/// First assignable last octet.
pub const FIRST_HOST: u8 = 2;
/// Last assignable last octet.
pub const LAST_HOST: u8 = 254;
/// Number of addresses which can be allocated in a subnet.
pub const POOL_SIZE: usize = (LAST_HOST - FIRST_HOST) as usize + 1;

/// Bijective mapping between addresses and node ids inside a /24 subnet.
///
/// Addresses are never released, nodes live as long as the network does.
#[derive(Clone, Debug)]
pub struct AddressSpace {
    subnet: Ipv4Addr,
    assigned: BTreeMap<Ipv4Addr, NodeId>,
}

impl AddressSpace {
    /// Creates an empty address space. Only the first three octets of `subnet` are used.
    pub fn new(subnet: Ipv4Addr) -> Self {
        let [a, b, c, _] = subnet.octets();
        Self {
            subnet: Ipv4Addr::new(a, b, c, 0),
            assigned: BTreeMap::new(),
        }
    }

    pub fn subnet(&self) -> Ipv4Addr {
        self.subnet
    }

    /// Returns the lowest free address of the pool without reserving it.
    pub fn next_free(&self) -> Option<Ipv4Addr> {
        let [a, b, c, _] = self.subnet.octets();
        (FIRST_HOST..=LAST_HOST)
            .map(|host| Ipv4Addr::new(a, b, c, host))
            .find(|address| !self.assigned.contains_key(address))
    }

    /// Assigns the lowest free address of the pool to `node_id`.
    pub fn allocate(&mut self, node_id: &NodeId) -> Result<Ipv4Addr, NetworkError> {
        let address = self
            .next_free()
            .ok_or(NetworkError::AddressPoolExhausted(self.subnet))?;
        self.assigned.insert(address, node_id.clone());
        Ok(address)
    }

    /// Records an address chosen by the caller. The address does not have to belong to the pool.
    pub fn reserve(&mut self, address: Ipv4Addr, node_id: &NodeId) -> Result<(), NetworkError> {
        if let Some(owner) = self.assigned.get(&address) {
            return Err(NetworkError::AddressInUse {
                address,
                owner: owner.clone(),
            });
        }
        self.assigned.insert(address, node_id.clone());
        Ok(())
    }

    pub fn resolve(&self, address: &Ipv4Addr) -> Option<&NodeId> {
        self.assigned.get(address)
    }

    pub fn contains(&self, address: &Ipv4Addr) -> bool {
        self.assigned.contains_key(address)
    }

    /// Whether `address` is one of the allocatable addresses of the subnet.
    pub fn in_pool(&self, address: &Ipv4Addr) -> bool {
        let [a, b, c, host] = address.octets();
        Ipv4Addr::new(a, b, c, 0) == self.subnet && (FIRST_HOST..=LAST_HOST).contains(&host)
    }

    /// Number of free addresses left in the pool.
    pub fn available(&self) -> usize {
        POOL_SIZE - self.assigned.keys().filter(|address| self.in_pool(address)).count()
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ipv4Addr, &NodeId)> {
        self.assigned.iter()
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new(Ipv4Addr::new(10, 0, 0, 0))
    }
}
