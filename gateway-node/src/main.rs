//! Gateway node - ESP32 dual-core firmware.
//!
//! Architecture:
//! - Core 0 (`core0`): host serial link, session/command controller,
//!   cadence estimation
//! - Core 1 (`core1`): ESP-NOW link to the sensor node
//!
//! Cross-core communication uses the packet queues in `shared`.

#![no_std]
#![no_main]

use esp_bootloader_esp_idf::esp_app_desc;
esp_app_desc!();

mod core0;
mod core1;
mod host_link;
mod shared;

extern crate alloc;

use alloc::boxed::Box;
use core::cell::RefCell;
use core::mem::MaybeUninit;
use critical_section::Mutex;
use esp_alloc as _;
use esp_hal::{
    clock::CpuClock,
    interrupt::software::SoftwareInterruptControl,
    main,
    system::Stack,
    time::Duration,
    timer::timg::{TimerGroup, Wdt},
    uart::{Config as UartConfig, Uart},
};
use esp_println::logger::init_logger;
use esp_radio::esp_now::EspNow;
use esp_radio::wifi::Config as WifiConfig;

const HOST_BAUD: u32 = 115_200;

// Core 1 stack (radio driver)
static mut CORE1_STACK: Stack<16384> = Stack::new();

// ESP-NOW handle passed from Core 0 to Core 1
pub(crate) static ESP_NOW: Mutex<RefCell<Option<EspNow<'static>>>> =
    Mutex::new(RefCell::new(None));

// Watchdog timer, fed by the Core 0 loop
pub(crate) static WATCHDOG: Mutex<RefCell<Option<Wdt<esp_hal::peripherals::TIMG1>>>> =
    Mutex::new(RefCell::new(None));

/// Feed the watchdog timer. Safe to call from any core.
pub fn feed_watchdog() {
    critical_section::with(|cs| {
        if let Some(ref mut wdt) = *WATCHDOG.borrow_ref_mut(cs) {
            wdt.feed();
        }
    });
}

#[main]
fn main() -> ! {
    // The host link shares UART0 with the logger; anything above warnings
    // would drown the protocol lines the host parses.
    init_logger(log::LevelFilter::Warn);

    // Initialize heap (required by the radio stack)
    const HEAP_SIZE: usize = 64 * 1024;
    static mut HEAP: MaybeUninit<[u8; HEAP_SIZE]> = MaybeUninit::uninit();
    unsafe {
        esp_alloc::HEAP.add_region(esp_alloc::HeapRegion::new(
            HEAP.as_mut_ptr() as *mut u8,
            HEAP_SIZE,
            esp_alloc::MemoryCapability::Internal.into(),
        ));
    }

    // Hardware init
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Initialize timer for esp-rtos scheduler
    let timg0 = TimerGroup::new(peripherals.TIMG0);

    // Start the esp-rtos scheduler (required before esp_radio::init)
    esp_rtos::start(timg0.timer0);

    // Initialize esp-radio and bring the WiFi driver up in station mode;
    // ESP-NOW rides on the STA interface without ever associating.
    let esp_radio_ctrl = esp_radio::init().unwrap();
    let (mut wifi_controller, interfaces) =
        esp_radio::wifi::new(&esp_radio_ctrl, peripherals.WIFI, WifiConfig::default()).unwrap();
    wifi_controller.start().unwrap();
    let esp_now = interfaces.esp_now;

    // Store the ESP-NOW handle in a static for Core 1 access.
    // SAFETY: esp_now borrows from esp_radio_ctrl. We leak the controller
    // and radio context to 'static below, making the borrow valid for
    // 'static. Core 1 takes exclusive ownership before the loop starts.
    critical_section::with(|cs| {
        ESP_NOW
            .borrow_ref_mut(cs)
            .replace(unsafe { core::mem::transmute(esp_now) });
    });

    // Keep the WiFi controller and radio context alive for the entire
    // program; this validates the transmute above.
    let _wifi_controller: &'static _ = Box::leak(Box::new(unsafe {
        core::mem::transmute::<_, esp_radio::wifi::WifiController<'static>>(wifi_controller)
    }));
    let _esp_radio_ctrl: &'static _ = Box::leak(Box::new(unsafe {
        core::mem::transmute::<_, esp_radio::Controller<'static>>(esp_radio_ctrl)
    }));

    // Watchdog on TIMG1 (TIMG0 drives the scheduler)
    let timg1 = TimerGroup::new(peripherals.TIMG1);
    let mut wdt = timg1.wdt;
    wdt.enable();
    wdt.set_timeout(
        esp_hal::timer::timg::MwdtStage::Stage0,
        Duration::from_secs(30),
    );
    critical_section::with(|cs| {
        WATCHDOG
            .borrow_ref_mut(cs)
            .replace(unsafe { core::mem::transmute(wdt) });
    });

    // Host link on UART0 (the USB bridge on most devkits)
    let uart_cfg = UartConfig::default().with_baudrate(HOST_BAUD);
    let uart = Uart::new(peripherals.UART0, uart_cfg)
        .unwrap()
        .with_rx(peripherals.GPIO3)
        .with_tx(peripherals.GPIO1);

    // Software interrupts for the esp-rtos multi-core scheduler
    let sw_ints = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);

    // Start Core 1 with the esp-rtos scheduler
    esp_rtos::start_second_core(
        peripherals.CPU_CTRL,
        sw_ints.software_interrupt0,
        sw_ints.software_interrupt1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        || {
            core1::run();
        },
    );

    // Core 0 main loop: host protocol and cadence estimation
    core0::run(uart);
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    critical_section::with(|_| {
        log::error!("PANIC: {}", info);
    });

    // Spin without feeding the watchdog; the 30s timeout resets the node.
    loop {
        core::hint::spin_loop();
    }
}
