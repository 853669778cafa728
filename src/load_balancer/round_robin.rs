//! Round-robin load balancing strategy.

use crate::load_balancer::{node::Node, LoadBalancer};

/// Round-robin selector.
///
/// Stateless: the cursor lives in the pool so that it is guarded by the same
/// lock as node health.
#[derive(Debug, Default)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for RoundRobin {
    fn next_node(&self, nodes: &[Node], cursor: &mut usize) -> Option<usize> {
        let len = nodes.len();
        if len == 0 {
            return None;
        }

        // At most one full lap; the cursor is untouched when nothing is healthy.
        let start = *cursor % len;
        for i in 0..len {
            let index = (start + i) % len;
            if nodes[index].healthy {
                *cursor = (index + 1) % len;
                return Some(index);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn nodes(n: usize) -> Vec<Node> {
        (0..n)
            .map(|i| {
                Node::new(
                    format!("n{}", i),
                    Url::parse(&format!("http://127.0.0.1:{}", 8545 + i)).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let nodes = nodes(3);
        let mut cursor = 0;

        let picks: Vec<_> = (0..6).map(|_| lb.next_node(&nodes, &mut cursor).unwrap()).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_skips_unhealthy() {
        let lb = RoundRobin::new();
        let mut nodes = nodes(3);
        nodes[1].healthy = false;
        let mut cursor = 0;

        let picks: Vec<_> = (0..4).map(|_| lb.next_node(&nodes, &mut cursor).unwrap()).collect();
        assert_eq!(picks, vec![0, 2, 0, 2]);
    }

    #[test]
    fn test_all_unhealthy_returns_none() {
        let lb = RoundRobin::new();
        let mut nodes = nodes(4);
        for n in &mut nodes {
            n.healthy = false;
        }
        let mut cursor = 2;

        assert_eq!(lb.next_node(&nodes, &mut cursor), None);
        assert_eq!(cursor, 2);
    }

    #[test]
    fn test_empty_pool() {
        let mut cursor = 0;
        assert_eq!(RoundRobin::new().next_node(&[], &mut cursor), None);
    }

    #[test]
    fn test_wraps_from_cursor() {
        let lb = RoundRobin::new();
        let mut nodes = nodes(3);
        nodes[2].healthy = false;
        let mut cursor = 2;

        assert_eq!(lb.next_node(&nodes, &mut cursor), Some(0));
        assert_eq!(cursor, 1);
    }
}
