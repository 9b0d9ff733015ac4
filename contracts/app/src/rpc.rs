//! JSON-RPC Provider
//!
//! [`Provider`] over Ethereum JSON-RPC: the fallback used when the host
//! injects no wallet. Transactions are signed by the node
//! (`eth_sendTransaction`), so the account must be unlocked there.

use std::cell::Cell;
use std::time::Duration;

use futures_timer::Delay;
use serde_json::{json, Value};

use goldmine_common::{
    config::ReceiptPolling,
    errors::{GoldError, GoldResult},
    provider::Provider,
    types::{Address, TransactionRequest, TxHash, TxReceipt},
    U256,
};

use crate::transport::Transport;

/// Ethereum JSON-RPC client
pub struct JsonRpcProvider<T> {
    transport: T,
    url: String,
    polling: ReceiptPolling,
    next_id: Cell<u64>,
}

impl<T: Transport> JsonRpcProvider<T> {
    pub fn new(transport: T, url: impl Into<String>, polling: ReceiptPolling) -> Self {
        Self {
            transport,
            url: url.into(),
            polling,
            next_id: Cell::new(1),
        }
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and unwrap its `result`
    pub fn request(&self, method: &str, params: Value) -> GoldResult<Value> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let mut response = self.transport.post_json(&self.url, &body)?;

        if let Some(error) = response.get("error") {
            return Err(GoldError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        response
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| GoldError::InvalidResponse {
                reason: format!("{} response has no result", method),
            })
    }

    fn receipt(&self, tx_hash: TxHash) -> GoldResult<Option<TxReceipt>> {
        let result = self.request("eth_getTransactionReceipt", json!([tx_hash.to_string()]))?;
        if result.is_null() {
            return Ok(None);
        }

        let field = |name: &str| {
            result
                .get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| GoldError::InvalidResponse {
                    reason: format!("receipt has no {}", name),
                })
        };

        let status = parse_quantity(field("status")?)?;
        let block_number = parse_quantity(field("blockNumber")?)?
            .to_u64()
            .ok_or(GoldError::Overflow)?;

        Ok(Some(TxReceipt {
            tx_hash,
            success: !status.is_zero(),
            block_number,
            gas_used: parse_quantity(field("gasUsed")?)?,
        }))
    }
}

// ============ Encoding Helpers ============

fn as_str(value: &Value, what: &str) -> GoldResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GoldError::InvalidResponse {
            reason: format!("{} is not a string", what),
        })
}

/// Parse a `0x`-prefixed hex quantity
pub fn parse_quantity(text: &str) -> GoldResult<U256> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16).map_err(|_| GoldError::InvalidResponse {
        reason: format!("bad quantity {:?}", text),
    })
}

/// Parse `0x`-prefixed hex data
pub fn parse_data(text: &str) -> GoldResult<Vec<u8>> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|_| GoldError::InvalidResponse {
        reason: "bad hex data".into(),
    })
}

fn encode_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

fn encode_quantity(value: u64) -> String {
    format!("{:#x}", value)
}

impl<T: Transport> Provider for JsonRpcProvider<T> {
    async fn accounts(&self) -> GoldResult<Vec<Address>> {
        let result = self.request("eth_accounts", json!([]))?;
        let entries = result.as_array().ok_or_else(|| GoldError::InvalidResponse {
            reason: "eth_accounts is not a list".into(),
        })?;

        entries
            .iter()
            .map(|entry| as_str(entry, "account")?.parse())
            .collect()
    }

    async fn network_id(&self) -> GoldResult<String> {
        let result = self.request("net_version", json!([]))?;
        match result {
            Value::Number(n) => Ok(n.to_string()),
            other => as_str(&other, "net_version"),
        }
    }

    async fn gas_price(&self) -> GoldResult<U256> {
        let result = self.request("eth_gasPrice", json!([]))?;
        parse_quantity(&as_str(&result, "gas price")?)
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> GoldResult<Vec<u8>> {
        let params = json!([{ "to": to.to_string(), "data": encode_data(&data) }, "latest"]);
        let result = self.request("eth_call", params)?;
        parse_data(&as_str(&result, "call result")?)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> GoldResult<TxHash> {
        let params = json!([{
            "from": tx.from.to_string(),
            "to": tx.to.to_string(),
            "data": encode_data(&tx.data),
            "gas": encode_quantity(tx.gas),
        }]);
        let result = self.request("eth_sendTransaction", params)?;
        as_str(&result, "transaction hash")?.parse()
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> GoldResult<TxReceipt> {
        for attempt in 0..self.polling.max_attempts {
            if let Some(receipt) = self.receipt(tx_hash)? {
                return Ok(receipt);
            }
            if attempt + 1 < self.polling.max_attempts && self.polling.interval_ms > 0 {
                Delay::new(Duration::from_millis(self.polling.interval_ms)).await;
            }
        }

        Err(GoldError::ReceiptTimeout {
            tx_hash,
            attempts: self.polling.max_attempts,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::executor::block_on;
    use goldmine_common::testing::address;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use test_case::test_case;

    /// Replies with queued results in order and records every request
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub replies: RefCell<VecDeque<Value>>,
        pub requests: RefCell<Vec<Value>>,
        pub forms: RefCell<Vec<(String, Vec<(String, String)>)>>,
        pub form_reply: RefCell<String>,
    }

    impl ScriptedTransport {
        pub fn reply(&self, result: Value) {
            self.replies.borrow_mut().push_back(json!({ "jsonrpc": "2.0", "id": 1, "result": result }));
        }

        pub fn reply_error(&self, code: i64, message: &str) {
            self.replies
                .borrow_mut()
                .push_back(json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } }));
        }

        pub fn methods(&self) -> Vec<String> {
            self.requests
                .borrow()
                .iter()
                .map(|r| r["method"].as_str().unwrap_or_default().to_string())
                .collect()
        }
    }

    impl Transport for ScriptedTransport {
        fn post_json(&self, _url: &str, body: &Value) -> GoldResult<Value> {
            self.requests.borrow_mut().push(body.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| GoldError::Transport { reason: "connection refused".into() })
        }

        fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> GoldResult<String> {
            let fields = fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
            self.forms.borrow_mut().push((url.to_string(), fields));
            Ok(self.form_reply.borrow().clone())
        }
    }

    fn provider(polling: ReceiptPolling) -> JsonRpcProvider<ScriptedTransport> {
        JsonRpcProvider::new(ScriptedTransport::default(), "http://127.0.0.1:7545", polling)
    }

    fn fast_polling(max_attempts: u32) -> ReceiptPolling {
        ReceiptPolling { interval_ms: 0, max_attempts }
    }

    fn receipt_json(status: &str) -> Value {
        json!({ "status": status, "blockNumber": "0x1b4", "gasUsed": "0x5208" })
    }

    #[test_case("0x0", 0 ; "zero")]
    #[test_case("0x4a817c800", 20_000_000_000 ; "twenty gwei")]
    #[test_case("0x", 0 ; "empty")]
    fn test_parse_quantity(text: &str, expected: u64) {
        assert_eq!(parse_quantity(text).unwrap(), U256::from(expected));
    }

    #[test]
    fn test_accounts_and_gas_price() {
        let rpc = provider(fast_polling(1));
        rpc.transport.reply(json!(["0x0101010101010101010101010101010101010101"]));
        rpc.transport.reply(json!("0x4a817c800"));

        assert_eq!(block_on(rpc.accounts()).unwrap(), vec![address(1)]);
        assert_eq!(block_on(rpc.gas_price()).unwrap(), U256::from(20_000_000_000u64));
        assert_eq!(rpc.transport.methods(), vec!["eth_accounts", "eth_gasPrice"]);
    }

    #[test]
    fn test_request_ids_increase() {
        let rpc = provider(fast_polling(1));
        rpc.transport.reply(json!("5777"));
        rpc.transport.reply(json!(5777));

        assert_eq!(block_on(rpc.network_id()).unwrap(), "5777");
        assert_eq!(block_on(rpc.network_id()).unwrap(), "5777");

        let ids: Vec<_> = rpc.transport.requests.borrow().iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_call_encodes_hex_and_decodes_result() {
        let rpc = provider(fast_polling(1));
        rpc.transport.reply(json!("0x00ff"));

        let data = block_on(rpc.call(address(0xAB), vec![0x70, 0xa0, 0x82, 0x31])).unwrap();
        assert_eq!(data, vec![0x00, 0xff]);

        let request = rpc.transport.requests.borrow()[0].clone();
        assert_eq!(request["params"][0]["data"], json!("0x70a08231"));
        assert_eq!(request["params"][1], json!("latest"));
    }

    #[test]
    fn test_send_transaction_sets_gas() {
        let rpc = provider(fast_polling(1));
        rpc.transport.reply(json!(format!("0x{}", "11".repeat(32))));

        let tx = TransactionRequest {
            from: address(1),
            to: address(2),
            data: vec![0xde, 0xad],
            gas: 500_000,
        };
        let hash = block_on(rpc.send_transaction(tx)).unwrap();
        assert_eq!(hash, TxHash([0x11; 32]));

        let request = rpc.transport.requests.borrow()[0].clone();
        assert_eq!(request["params"][0]["gas"], json!("0x7a120"));
    }

    #[test]
    fn test_rpc_error_object_is_returned() {
        let rpc = provider(fast_polling(1));
        rpc.transport.reply_error(4001, "User denied transaction signature");

        let err = block_on(rpc.gas_price()).unwrap_err();
        assert_eq!(
            err,
            GoldError::Rpc { code: 4001, message: "User denied transaction signature".into() }
        );
    }

    #[test]
    fn test_receipt_is_polled_until_mined() {
        let rpc = provider(fast_polling(5));
        rpc.transport.reply(Value::Null);
        rpc.transport.reply(Value::Null);
        rpc.transport.reply(receipt_json("0x1"));

        let receipt = block_on(rpc.wait_for_receipt(TxHash([7; 32]))).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.block_number, 436);
        assert_eq!(receipt.gas_used, U256::from(21_000u64));
        assert_eq!(rpc.transport.requests.borrow().len(), 3);
    }

    #[test]
    fn test_failed_status_is_unsuccessful_receipt() {
        let rpc = provider(fast_polling(1));
        rpc.transport.reply(receipt_json("0x0"));
        assert!(!block_on(rpc.wait_for_receipt(TxHash([7; 32]))).unwrap().success);
    }

    #[test]
    fn test_receipt_timeout() {
        let rpc = provider(fast_polling(2));
        rpc.transport.reply(Value::Null);
        rpc.transport.reply(Value::Null);

        assert_eq!(
            block_on(rpc.wait_for_receipt(TxHash([7; 32]))).unwrap_err(),
            GoldError::ReceiptTimeout { tx_hash: TxHash([7; 32]), attempts: 2 }
        );
    }

    #[test]
    fn test_gate_sends_both_approvals_before_polling_receipts() {
        use goldmine_common::types::{AllowanceState, TokenKind};
        use goldmine_token::gate::{AllowanceGate, ApprovalPlan, PendingApproval};
        use goldmine_token::RpcErc20;
        use std::rc::Rc;

        let rpc = Rc::new(provider(fast_polling(1)));
        rpc.transport.reply(json!(format!("0x{}", "11".repeat(32))));
        rpc.transport.reply(json!(format!("0x{}", "22".repeat(32))));
        rpc.transport.reply(receipt_json("0x1"));
        rpc.transport.reply(receipt_json("0x1"));

        let stable = RpcErc20::new(rpc.clone(), address(0xA1), TokenKind::Stable);
        let reward = RpcErc20::new(rpc.clone(), address(0xB2), TokenKind::Reward);
        let gate = AllowanceGate::new(&stable, &reward, address(1), address(0x5E), 100_000);

        let empty = |token| AllowanceState { token, balance: U256::MAX, allowance: U256::zero() };
        let plan = ApprovalPlan {
            states: [empty(TokenKind::Stable), empty(TokenKind::Reward)],
            pending: vec![
                PendingApproval { token: TokenKind::Stable, amount: U256::from(800_000_000u64) },
                PendingApproval { token: TokenKind::Reward, amount: U256::from(7u64) },
            ],
        };

        let receipts = block_on(gate.approve(&plan)).unwrap();
        assert_eq!(receipts.len(), 2);
        assert_eq!(
            rpc.transport.methods(),
            vec![
                "eth_sendTransaction",
                "eth_sendTransaction",
                "eth_getTransactionReceipt",
                "eth_getTransactionReceipt",
            ]
        );
    }
}
