//! End-to-end scenarios across pool, engine and state.

use crate::harness::{account_of, signed_transfer, TestChain};
use ember_mempool::MempoolError;
use ember_vm::{VmError, MINT_AMOUNT};

#[test]
fn test_end_to_end_transfer_accounting() {
    let mut chain = TestChain::new();
    let sender = account_of(1);
    let receiver = [0x99; 20];

    chain.vm.mint(&sender).unwrap();
    assert_eq!(chain.vm.get_account(&sender).unwrap().balance, MINT_AMOUNT);

    chain
        .pool
        .submit(signed_transfer(1, 1, receiver, 50, 1_000, 1))
        .unwrap();
    chain
        .pool
        .submit(signed_transfer(1, 2, receiver, 30, 800, 1))
        .unwrap();
    chain
        .pool
        .submit(signed_transfer(1, 3, receiver, 20, 600, 1))
        .unwrap();

    assert_eq!(chain.run_ready(), 3);

    let sender_account = chain.vm.get_account(&sender).unwrap();
    let receiver_account = chain.vm.get_account(&receiver).unwrap();

    // 1_000_000 - (50 + 30 + 20) - (1000 + 800 + 600) * 1
    assert_eq!(sender_account.balance, 997_500);
    assert_eq!(sender_account.nonce, 3);
    assert_eq!(receiver_account.balance, 100);
    assert!(chain.pool.is_empty());
}

#[test]
fn test_gas_price_selects_across_senders() {
    let mut chain = TestChain::new();
    chain.vm.mint(&account_of(1)).unwrap();
    chain.vm.mint(&account_of(2)).unwrap();

    chain
        .pool
        .submit(signed_transfer(1, 1, [0x99; 20], 10, 1_000, 5))
        .unwrap();
    chain
        .pool
        .submit(signed_transfer(2, 1, [0x99; 20], 10, 1_000, 3))
        .unwrap();

    let first = chain.pool.extract_one().unwrap();
    let second = chain.pool.extract_one().unwrap();
    assert_eq!(first.sender, account_of(1));
    assert_eq!(second.sender, account_of(2));
    assert!(chain.pool.extract_one().is_none());
}

#[test]
fn test_gap_filling_through_execution() {
    let mut chain = TestChain::new();
    let sender = account_of(1);
    let receiver = [0x99; 20];
    chain.vm.mint(&sender).unwrap();

    // Account nonce is 0; nonce 3 and 2 wait in the queue until 1 lands.
    chain
        .pool
        .submit(signed_transfer(1, 3, receiver, 1, 100, 1))
        .unwrap();
    chain
        .pool
        .submit(signed_transfer(1, 2, receiver, 1, 100, 1))
        .unwrap();
    assert_eq!(chain.pool.pending_count(), 0);
    assert_eq!(chain.pool.queued_count(), 2);

    chain
        .pool
        .submit(signed_transfer(1, 1, receiver, 1, 100, 1))
        .unwrap();
    assert_eq!(chain.pool.pending_count(), 3);
    assert_eq!(chain.pool.queued_count(), 0);

    let mut nonces = Vec::new();
    while let Some(tx) = chain.pool.extract_one() {
        nonces.push(tx.nonce);
        chain.vm.execute(&tx.transaction).unwrap();
    }
    assert_eq!(nonces, vec![1, 2, 3]);
    assert_eq!(chain.vm.get_account(&sender).unwrap().nonce, 3);

    // The executed nonces are now below the account nonce.
    let stale = chain.pool.submit(signed_transfer(1, 3, receiver, 1, 100, 1));
    assert!(matches!(stale, Err(MempoolError::NonceTooLow { .. })));

    // The next nonce goes straight to pending.
    chain
        .pool
        .submit(signed_transfer(1, 4, receiver, 1, 100, 1))
        .unwrap();
    assert_eq!(chain.pool.pending_count(), 1);
}

#[test]
fn test_insufficient_balance_rejected_cleanly() {
    let mut chain = TestChain::new();
    let sender = account_of(1);
    let receiver = [0x99; 20];
    chain.vm.mint(&sender).unwrap();
    let root_before = chain.state.read().root_hash();

    chain
        .pool
        .submit(signed_transfer(1, 1, receiver, 2_000_000, 1_000, 1))
        .unwrap();

    let tx = chain.pool.extract_one().unwrap();
    let result = chain.vm.execute(&tx.transaction);
    assert!(matches!(result, Err(VmError::InsufficientBalance { .. })));

    assert_eq!(chain.vm.get_account(&sender).unwrap().balance, MINT_AMOUNT);
    assert_eq!(chain.vm.get_account(&sender).unwrap().nonce, 0);
    assert_eq!(chain.vm.get_account(&receiver).unwrap().balance, 0);
    assert_eq!(chain.state.read().root_hash(), root_before);
}

#[test]
fn test_replacement_flows_into_execution() {
    let mut chain = TestChain::new();
    let sender = account_of(1);
    let receiver = [0x99; 20];
    chain.vm.mint(&sender).unwrap();

    chain
        .pool
        .submit(signed_transfer(1, 1, receiver, 10, 1_000, 2))
        .unwrap();
    // Replace the pending transaction before anyone extracts it.
    chain
        .pool
        .submit(signed_transfer(1, 1, receiver, 75, 1_000, 2))
        .unwrap();

    assert_eq!(chain.run_ready(), 1);
    assert_eq!(chain.vm.get_account(&receiver).unwrap().balance, 75);
    assert_eq!(
        chain.vm.get_account(&sender).unwrap().balance,
        MINT_AMOUNT - 75 - 1_000
    );
}

#[test]
fn test_root_is_function_of_executed_sequence() {
    let build = || {
        let mut chain = TestChain::new();
        let sender = account_of(1);
        chain.vm.mint(&sender).unwrap();
        chain.vm.mint(&account_of(2)).unwrap();

        chain
            .pool
            .submit(signed_transfer(1, 1, [0x11; 20], 40, 500, 2))
            .unwrap();
        chain
            .pool
            .submit(signed_transfer(2, 1, [0x22; 20], 60, 700, 1))
            .unwrap();
        chain.run_ready();
        let hash = chain.state.read().root_hash();
        hash
    };

    assert_eq!(build(), build());
}

#[test]
fn test_journal_refills_pool_after_restart() {
    use ember_mempool::{TrieAccountReader, TxJournal, TxPool};

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pool.journal");

    let mut chain = TestChain::new();
    let sender = account_of(1);
    chain.vm.mint(&sender).unwrap();

    let tx1 = signed_transfer(1, 1, [0x99; 20], 5, 100, 1);
    let tx2 = signed_transfer(1, 2, [0x99; 20], 5, 100, 1);
    chain.pool.submit(tx1.clone()).unwrap();
    chain.pool.submit(tx2.clone()).unwrap();

    let mut journal = TxJournal::new(&path);
    journal.rotate(&[tx1, tx2]).unwrap();
    journal.close().unwrap();

    // "Restart": a fresh pool over the same state, refilled from disk.
    let mut restarted = TxPool::new(TrieAccountReader::new(chain.state.clone()));
    let replayed = TxJournal::new(&path)
        .load(|tx| restarted.submit(tx))
        .unwrap();

    assert_eq!(replayed, 2);
    assert_eq!(restarted.pending_count(), 2);
    let nonces: Vec<u64> = std::iter::from_fn(|| restarted.extract_one())
        .map(|tx| tx.nonce)
        .collect();
    assert_eq!(nonces, vec![1, 2]);
}

#[test]
fn test_pool_sees_trie_nonces_live() {
    let mut chain = TestChain::new();
    let sender = account_of(1);
    chain.vm.mint(&sender).unwrap();

    chain
        .pool
        .submit(signed_transfer(1, 1, [0x99; 20], 1, 100, 1))
        .unwrap();
    assert_eq!(chain.run_ready(), 1);

    // The frontier moved with execution: nonce 2 is now executable
    // immediately, nonce 1 is stale.
    assert!(matches!(
        chain.pool.submit(signed_transfer(1, 1, [0x99; 20], 1, 100, 1)),
        Err(MempoolError::NonceTooLow { .. })
    ));
    chain
        .pool
        .submit(signed_transfer(1, 2, [0x99; 20], 1, 100, 1))
        .unwrap();
    assert_eq!(chain.pool.pending_count(), 1);
}
