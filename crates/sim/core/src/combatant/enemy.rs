use crate::config::EnemyConfig;
use crate::damage::TargetView;
use crate::ledger::BuffLedger;

/// The shared target together with its debuff ledger.
#[derive(Clone, Debug, Default)]
pub struct Enemy {
    config: EnemyConfig,
    ledger: BuffLedger,
}

impl Enemy {
    pub fn new(config: EnemyConfig) -> Self {
        Self {
            config,
            ledger: BuffLedger::new(),
        }
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn ledger(&self) -> &BuffLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut BuffLedger {
        &mut self.ledger
    }

    pub fn view(&mut self) -> TargetView<'_> {
        TargetView {
            defense: self.config.defense,
            element: self.config.element,
            size: self.config.size,
            core_size: self.config.core_size,
            ledger: &mut self.ledger,
        }
    }
}
