//! Echo demo over a simulated UART.
//!
//! Run with: `RUST_LOG=debug cargo run -p isr-ring-uart --bin echo-demo`

use anyhow::{anyhow, Context};
use isr_ring::{
    DropNewest, OverwriteOldest, RingBuffer, RingConfig, UART_RX_CAPACITY, UART_RX_CONFIG,
};
use isr_ring_uart::sim::SimulatedUart;
use isr_ring_uart::{init, FlowControl, Monitor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

static RX: RingBuffer<UART_RX_CAPACITY> = RingBuffer::with_config(UART_RX_CONFIG);

/// RTS line stand-in: logs and counts edges.
#[derive(Debug, Default)]
struct RtsLine {
    asserted: bool,
    edges: usize,
}

impl FlowControl for RtsLine {
    fn assert_backpressure(&mut self) {
        info!("RTS deasserted, peer should pause");
        self.asserted = true;
        self.edges += 1;
    }

    fn release_backpressure(&mut self) {
        info!("RTS asserted, peer may resume");
        self.asserted = false;
        self.edges += 1;
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== isr-ring echo demo ===\n");

    demo_basic_echo()?;
    demo_threaded_isr()?;
    demo_burst_and_backpressure()?;
    demo_overwrite_oldest()?;

    println!("\n=== All demos completed ===");
    Ok(())
}

/// Demo 1: interrupt and main loop interleaved on one thread
fn demo_basic_echo() -> anyhow::Result<()> {
    println!("--- Demo 1: Basic Echo ---");

    let ring: RingBuffer<16, DropNewest> = RingBuffer::new();
    let (rx, mut echo) = init(&ring)?;
    let uart = SimulatedUart::new(2);
    uart.enable_rx_interrupt();

    for byte in *b"hello, isr-ring\r\n" {
        uart.receive(byte);
        uart.irq_handler(&rx);
        echo.run(&mut uart.tx_sink());
    }

    let wire = uart.transmitted();
    println!("  Echoed: {:?}", String::from_utf8_lossy(&wire));
    println!("  Status: {}\n", ring.status());
    Ok(())
}

/// Demo 2: receive interrupt on its own thread, main loop polling
fn demo_threaded_isr() -> anyhow::Result<()> {
    println!("--- Demo 2: Threaded ISR ---");

    const BYTES: usize = 4096;

    let (rx, mut echo) = init(&RX).context("claiming the rx ring")?;
    let mut monitor = Monitor::with_flow_control(&RX, RtsLine::default());
    let uart = Arc::new(SimulatedUart::new(1));
    uart.enable_rx_interrupt();
    let done = Arc::new(AtomicBool::new(false));

    let isr = {
        let uart = Arc::clone(&uart);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..BYTES {
                uart.receive((i % 251) as u8);
                uart.irq_handler(&rx);
                if i % 256 == 255 {
                    thread::sleep(Duration::from_micros(200));
                }
            }
            done.store(true, Ordering::Release);
        })
    };

    loop {
        let finished = done.load(Ordering::Acquire);
        echo.run(&mut uart.tx_sink());
        monitor.poll();
        if finished && RX.is_empty() {
            break;
        }
        thread::yield_now();
    }
    isr.join().map_err(|_| anyhow!("isr thread panicked"))?;

    let status = monitor.poll();
    println!(
        "  Received {} bytes, echoed {}, overflows {}",
        BYTES,
        echo.forwarded(),
        status.overflow_count
    );
    println!("  Flow-control edges: {}", monitor.flow_control().edges);
    println!("  Status: {status}\n");
    Ok(())
}

/// Demo 3: a burst with the main loop stalled crosses both watermarks
fn demo_burst_and_backpressure() -> anyhow::Result<()> {
    println!("--- Demo 3: Burst and Backpressure ---");

    let ring: RingBuffer<64, DropNewest> =
        RingBuffer::try_with_config(RingConfig::for_capacity(64))?;
    let (rx, mut echo) = init(&ring)?;
    let mut monitor = Monitor::with_flow_control(&ring, RtsLine::default());

    for byte in 0..80u8 {
        rx.on_byte_received(byte);
    }
    let status = monitor.poll();
    println!("  After burst: {status}");
    println!("  RTS paused: {}", monitor.flow_control().asserted);

    let mut wire = Vec::new();
    while !ring.is_empty() {
        let drained = echo.run_budgeted(8, &mut wire);
        let status = monitor.poll();
        println!(
            "  Drained {}: level={} paused={}",
            drained,
            status.level,
            monitor.flow_control().asserted
        );
    }
    println!(
        "  Echoed {} bytes, first {:?}, last {:?}\n",
        wire.len(),
        wire.first(),
        wire.last()
    );
    Ok(())
}

/// Demo 4: same burst with overwrite-oldest keeps the newest bytes
fn demo_overwrite_oldest() -> anyhow::Result<()> {
    println!("--- Demo 4: Overwrite Oldest ---");

    let ring: RingBuffer<64, OverwriteOldest> = RingBuffer::with_config(UART_RX_CONFIG);
    let (rx, mut echo) = init(&ring)?;
    let mut monitor = Monitor::new(&ring);

    for byte in 0..80u8 {
        rx.on_byte_received(byte);
    }
    let status = monitor.poll();

    let mut wire = Vec::new();
    echo.run(&mut wire);
    println!("  Policy: {}", ring.policy_name());
    println!("  Overflows: {}", status.overflow_count);
    println!(
        "  Echoed {} bytes, first {:?}, last {:?}",
        wire.len(),
        wire.first(),
        wire.last()
    );
    Ok(())
}
