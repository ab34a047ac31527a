//! Code Context Provider
//!
//! Supplies source text for a file (and optionally a line) so the patch
//! synthesizer has something to rewrite.

pub mod http;

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub use http::HttpCodeContext;

/// Placeholder used when the source text cannot be retrieved
pub const SOURCE_NOT_FOUND: &str = "// Code not found";

#[async_trait]
pub trait CodeContextProvider: Send + Sync {
    /// Source text for `file_path`, or `None` if the provider does not have it
    async fn fetch(&self, file_path: &str, line_number: Option<&str>) -> Result<Option<String>>;
}

/// Fixed path → snippet table
#[derive(Debug, Clone, Default)]
pub struct StaticCodeContext {
    snippets: HashMap<String, String>,
}

impl StaticCodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snippet(mut self, path: impl Into<String>, code: impl Into<String>) -> Self {
        self.snippets.insert(path.into(), code.into());
        self
    }

    /// Snippets of the reference application's known defects
    pub fn seeded() -> Self {
        Self::new()
            .with_snippet("src/api/users.js", USERS_ROUTE)
            .with_snippet("src/api/payments.js", PAYMENTS_ROUTE)
            .with_snippet("src/services/userService.js", USER_SERVICE)
    }
}

#[async_trait]
impl CodeContextProvider for StaticCodeContext {
    async fn fetch(&self, file_path: &str, _line_number: Option<&str>) -> Result<Option<String>> {
        Ok(self.snippets.get(file_path).cloned())
    }
}

const USERS_ROUTE: &str = r#"const express = require('express');
const router = express.Router();
const UserService = require('../services/userService');
const { validateUser } = require('../utils/validators');

const userService = new UserService();

router.get('/:id', async (req, res, next) => {
  try {
    const user = await userService.getUserById(req.params.id);

    console.log(`Fetching profile for user: ${user.id}`);

    const profile = await userService.getUserProfile(user.id);

    res.json({
      user,
      profile
    });
  } catch (error) {
    next(error);
  }
});"#;

const PAYMENTS_ROUTE: &str = r#"router.post('/process', async (req, res, next) => {
  try {
    const { userId, amount, paymentMethod } = req.body;

    paymentService.validatePayment(userId, amount)
      .then(isValid => {
        if (!isValid) {
          throw new Error('Payment validation failed');
        }
        return paymentService.processPayment(paymentMethod, amount);
      })
      .then(result => {
        res.json(result);
      });
  } catch (error) {
    next(error);
  }
});

router.get('/analytics/:merchantId', async (req, res, next) => {
  try {
    const { merchantId } = req.params;
    const transactions = await paymentService.getTransactions(merchantId);

    const totalAmount = transactions.reduce((sum, t) => sum + t.amount, 0);
    const averageAmount = totalAmount / transactions.length;

    res.json({
      totalTransactions: transactions.length,
      totalAmount,
      averageAmount
    });
  } catch (error) {
    next(error);
  }
});"#;

const USER_SERVICE: &str = r#"async deleteUser(id) {
    await new Promise(resolve => setTimeout(resolve, 50));

    if (Math.random() < 0.3) {
      throw new Error('Database connection lost');
    }

    this.users.delete(id);
  }"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_lookup() {
        let context = StaticCodeContext::seeded();
        let code = context.fetch("src/api/users.js", Some("11")).await.unwrap();
        assert!(code.unwrap().contains("user.id"));

        assert!(context.fetch("src/api/missing.js", None).await.unwrap().is_none());
    }
}
