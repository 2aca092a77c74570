//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::IpNetwork;

// Address family of an interface address.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

// Separate IPv4 and IPv6 instances of the same table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AddressFamilies<T> {
    pub ipv4: T,
    pub ipv6: T,
}

pub trait IpNetworkExt {
    fn address_family(&self) -> AddressFamily;
}

// ===== impl AddressFamily =====

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "ipv4"),
            AddressFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}

// ===== impl AddressFamilies =====

impl<T> AddressFamilies<T> {
    pub fn get(&self, af: AddressFamily) -> &T {
        match af {
            AddressFamily::Ipv4 => &self.ipv4,
            AddressFamily::Ipv6 => &self.ipv6,
        }
    }

    pub fn get_mut(&mut self, af: AddressFamily) -> &mut T {
        match af {
            AddressFamily::Ipv4 => &mut self.ipv4,
            AddressFamily::Ipv6 => &mut self.ipv6,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressFamily, &T)> {
        [
            (AddressFamily::Ipv4, &self.ipv4),
            (AddressFamily::Ipv6, &self.ipv6),
        ]
        .into_iter()
    }
}

// ===== impl IpNetwork =====

impl IpNetworkExt for IpNetwork {
    fn address_family(&self) -> AddressFamily {
        match self {
            IpNetwork::V4(_) => AddressFamily::Ipv4,
            IpNetwork::V6(_) => AddressFamily::Ipv6,
        }
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_family_tables() {
        let mut tables = AddressFamilies::<Vec<IpNetwork>>::default();
        for addr in ["10.0.0.1/24", "2001:db8::1/64", "10.0.1.1/24"] {
            let addr: IpNetwork = addr.parse().unwrap();
            tables.get_mut(addr.address_family()).push(addr);
        }
        assert_eq!(tables.get(AddressFamily::Ipv4).len(), 2);
        assert_eq!(tables.get(AddressFamily::Ipv6).len(), 1);
        assert_eq!(
            tables.iter().map(|(af, _)| af.to_string()).collect::<Vec<_>>(),
            ["ipv4", "ipv6"]
        );
    }
}
