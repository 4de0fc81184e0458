//! In-memory gateway that records every command it is given.

use super::types::{Command, OrderId};
use super::Gateway;

/// Gateway sink that keeps commands in memory instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    commands: Vec<Command>,
}

impl RecordingGateway {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands recorded so far, in send order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Insert-order commands only.
    pub fn inserts(&self) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::InsertOrder { .. }))
            .collect()
    }

    /// Hedge-order commands only.
    pub fn hedges(&self) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::HedgeOrder { .. }))
            .collect()
    }

    /// Ids of every cancelled order, in send order.
    pub fn cancelled_ids(&self) -> Vec<OrderId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::CancelOrder { order_id } => Some(*order_id),
                _ => None,
            })
            .collect()
    }

    /// Drain the recorded commands.
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl Gateway for RecordingGateway {
    fn send(&mut self, command: Command) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Lifespan, Side};

    #[test]
    fn test_recorder_filters_by_kind() {
        let mut gateway = RecordingGateway::new();
        gateway.send(Command::InsertOrder {
            order_id: 1,
            side: Side::Buy,
            price: 14800,
            volume: 5,
            lifespan: Lifespan::FillAndKill,
        });
        gateway.send(Command::CancelOrder { order_id: 1 });
        gateway.send(Command::HedgeOrder {
            order_id: 2,
            side: Side::Sell,
            price: 100,
            volume: 5,
        });

        assert_eq!(gateway.inserts().len(), 1);
        assert_eq!(gateway.hedges().len(), 1);
        assert_eq!(gateway.cancelled_ids(), vec![1]);
        assert_eq!(gateway.take().len(), 3);
        assert!(gateway.commands().is_empty());
    }
}
