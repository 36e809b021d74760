//! Implementação dos comandos CLI do memokit.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::key::{CacheKey, KeyError};
use crate::memo::{Memoized, MemoStats, Recur, RecursiveMemo};
use crate::observer::{LoggingObserver, MemoEvent, RecordingObserver};
use crate::types::config::{Config, CONFIG_FILE};
use crate::{MemoError, MemoResult};

/// Largest n whose fibonacci number fits in a `u64`.
pub const MAX_FIB: u64 = 93;

/// Largest n computed with the plain exponential recursion.
pub const MAX_NAIVE_FIB: u64 = 40;

/// Initializes configuration in the specified directory.
pub fn init(path: Option<PathBuf>) -> MemoResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    Config::default_config().save(&config_path)?;

    println!("Configuration created at: {}", config_path.display());
    Ok(())
}

/// Prints the effective configuration.
pub fn config_cmd(config: &Config, path: &Path) -> MemoResult<()> {
    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# defaults ({} not found)", path.display());
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Prints the cache key of a JSON argument list.
pub fn key(args: &str, config: &Config) -> MemoResult<()> {
    let value: serde_json::Value = serde_json::from_str(args)?;
    let key = CacheKey::from_args(&value, config.keys.digest)?;

    tracing::debug!(digest = %config.keys.digest, "Key derived");
    println!("{}", key);
    Ok(())
}

/// Naive recursive fibonacci; every invocation bumps `calls`.
fn naive_fib(n: u64, calls: &Cell<u64>) -> u64 {
    calls.set(calls.get() + 1);
    if n <= 1 {
        n
    } else {
        naive_fib(n - 1, calls) + naive_fib(n - 2, calls)
    }
}

/// Result of one fibonacci run.
#[derive(Debug, Clone, PartialEq)]
pub struct FibReport {
    pub value: u64,
    /// Invocations of the underlying function, cumulative over both calls.
    pub invocations: u64,
    /// Invocations caused by the second, identical call.
    pub repeat_invocations: u64,
    pub stats: MemoStats,
    pub events: Vec<(MemoEvent, String)>,
}

/// Calls memoized fibonacci twice with the same `n`.
///
/// Without `recursive` only the outermost call is cached, so the first call
/// still walks the whole exponential tree.
pub fn run_fib(n: u64, recursive: bool, config: &Config) -> MemoResult<FibReport> {
    if n > MAX_FIB {
        return Err(MemoError::other(format!(
            "fib({}) overflows u64 (max n = {})",
            n, MAX_FIB
        )));
    }
    if !recursive && n > MAX_NAIVE_FIB {
        return Err(MemoError::other(format!(
            "n = {} is too large without --recursive (max {})",
            n, MAX_NAIVE_FIB
        )));
    }

    let recorder = RecordingObserver::new();
    let calls = Cell::new(0u64);
    let strategy = config.key_strategy();

    if recursive {
        let mut fib = RecursiveMemo::with_strategy(
            |fib: &mut Recur<'_, u64, u64, KeyError, _>, n: &u64| {
                calls.set(calls.get() + 1);
                if *n <= 1 {
                    Ok(*n)
                } else {
                    Ok(fib.call(&(n - 1))? + fib.call(&(n - 2))?)
                }
            },
            strategy,
        )
        .with_observer(Box::new(LoggingObserver))
        .with_observer(Box::new(recorder.clone()));

        let value = fib.call(&n)?;
        let first = calls.get();
        fib.call(&n)?;

        return Ok(FibReport {
            value,
            invocations: calls.get(),
            repeat_invocations: calls.get() - first,
            stats: fib.stats(),
            events: recorder.events(),
        });
    }

    let mut fib = Memoized::with_strategy(|n: &u64| naive_fib(*n, &calls), strategy)
        .with_observer(Box::new(LoggingObserver))
        .with_observer(Box::new(recorder.clone()));

    let value = fib.call(&n)?;
    let first = calls.get();
    fib.call(&n)?;

    Ok(FibReport {
        value,
        invocations: calls.get(),
        repeat_invocations: calls.get() - first,
        stats: fib.stats(),
        events: recorder.events(),
    })
}

/// Runs the fibonacci demonstration.
pub fn fib(n: u64, recursive: bool, trace: bool, config: &Config) -> MemoResult<()> {
    let report = run_fib(n, recursive, config)?;

    println!("fib({}) = {}", n, report.value);
    println!("  mode:               {}", if recursive { "recursive" } else { "outermost only" });
    println!("  invocations:        {}", report.invocations);
    println!("  repeat invocations: {}", report.repeat_invocations);
    print_stats(&report.stats);

    if trace {
        println!("  events:");
        for (event, key) in &report.events {
            println!("    {:<8} {}", event.to_string(), key);
        }
    }

    Ok(())
}

/// Counters collected by the demonstration scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    /// fib(10) twice: value, underlying invocations.
    pub fib: (u64, u64),
    /// add(2, 3) and add(3, 2): results and invocations.
    pub add: (i64, i64, u32),
    /// double(-1) twice, double(5) twice: error count, results, invocations.
    pub double: (u32, i64, i64, u32),
}

/// Runs scenarios A, B and C.
pub fn run_demo(config: &Config) -> MemoResult<DemoReport> {
    let strategy = config.key_strategy();

    // A: only the outer call is memoized
    let fib = run_fib(10, false, config)?;

    // B: argument position is part of the key
    let add_calls = Cell::new(0u32);
    let mut add = Memoized::with_strategy(
        |(a, b): &(i64, i64)| {
            add_calls.set(add_calls.get() + 1);
            a + b
        },
        strategy,
    );
    let first = add.call(&(2, 3))?;
    let second = add.call(&(3, 2))?;

    // C: failures are never cached
    let double_calls = Cell::new(0u32);
    let mut double = Memoized::with_strategy(
        |x: &i64| {
            double_calls.set(double_calls.get() + 1);
            if *x < 0 {
                Err(MemoError::other("neg"))
            } else {
                Ok(x * 2)
            }
        },
        strategy,
    )
    .with_observer(Box::new(LoggingObserver));

    let mut errors = 0;
    for _ in 0..2 {
        if double.try_call(&-1).is_err() {
            errors += 1;
        }
    }
    let five = double.try_call(&5)?;
    let five_again = double.try_call(&5)?;

    Ok(DemoReport {
        fib: (fib.value, fib.invocations),
        add: (first, second, add_calls.get()),
        double: (errors, five, five_again, double_calls.get()),
    })
}

/// Runs the demonstration scenarios and prints their counters.
pub fn demo(config: &Config) -> MemoResult<()> {
    let report = run_demo(config)?;

    println!("A. memoized fib(10), called twice");
    println!("   result = {}, underlying invocations = {}", report.fib.0, report.fib.1);

    println!("B. add(2, 3) then add(3, 2)");
    println!(
        "   results = {} / {}, invocations = {}",
        report.add.0, report.add.1, report.add.2
    );

    println!("C. double(-1) twice, then double(5) twice");
    println!(
        "   errors = {}, results = {} / {}, invocations = {}",
        report.double.0, report.double.1, report.double.2, report.double.3
    );

    Ok(())
}

/// Shows version.
pub fn version() {
    println!("memokit v{}", env!("CARGO_PKG_VERSION"));
}

fn print_stats(stats: &MemoStats) {
    println!(
        "  cache:              {} entries, {} hits, {} misses, {} failures ({:.0}% hit rate)",
        stats.entries,
        stats.hits,
        stats.misses,
        stats.failures,
        stats.hit_rate() * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyDigest;
    use tempfile::TempDir;

    #[test]
    fn test_naive_fib_call_count() {
        let calls = Cell::new(0);
        assert_eq!(naive_fib(10, &calls), 55);
        assert_eq!(calls.get(), 177);
    }

    #[test]
    fn test_run_fib_outermost_only() {
        let report = run_fib(10, false, &Config::default_config()).unwrap();
        assert_eq!(report.value, 55);
        assert_eq!(report.invocations, 177);
        assert_eq!(report.repeat_invocations, 0);
        assert_eq!(report.stats.hits, 1);
        assert_eq!(report.stats.misses, 1);
        assert_eq!(report.events.len(), 2);
    }

    #[test]
    fn test_run_fib_recursive() {
        let mut config = Config::default_config();
        config.keys.digest = KeyDigest::Sha256;

        let report = run_fib(10, true, &config).unwrap();
        assert_eq!(report.value, 55);
        assert_eq!(report.invocations, 11);
        assert_eq!(report.repeat_invocations, 0);
        assert_eq!(report.stats.entries, 11);
    }

    #[test]
    fn test_run_fib_limits() {
        let config = Config::default_config();
        assert!(run_fib(MAX_NAIVE_FIB + 1, false, &config).is_err());
        assert!(run_fib(MAX_FIB + 1, true, &config).is_err());
        assert_eq!(run_fib(MAX_FIB, true, &config).unwrap().value, 12_200_160_415_121_876_738);
    }

    #[test]
    fn test_run_demo_scenarios() {
        let report = run_demo(&Config::default_config()).unwrap();
        assert_eq!(report.fib, (55, 177));
        assert_eq!(report.add, (5, 5, 2));
        assert_eq!(report.double, (2, 10, 10, 3));
    }

    #[test]
    fn test_key_rejects_invalid_json() {
        let err = key("[1,", &Config::default_config()).unwrap_err();
        assert!(matches!(err, MemoError::Json(_)));
    }

    #[test]
    fn test_init_writes_once() {
        let dir = TempDir::new().unwrap();
        init(Some(dir.path().to_path_buf())).unwrap();

        let path = dir.path().join(CONFIG_FILE);
        assert!(path.exists());

        std::fs::write(&path, "[keys]\ndigest = \"sha256\"\n").unwrap();
        init(Some(dir.path().to_path_buf())).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("sha256"));
    }
}
