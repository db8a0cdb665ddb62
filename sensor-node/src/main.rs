//! Foot-mounted sensor node - ESP32 dual-core firmware.
//!
//! Architecture:
//! - Core 0 (`core0`): pressure sampling, step detection, tempo buttons,
//!   weight calibration
//! - Core 1 (`core1`): ESP-NOW link to the gateway node
//!
//! Cross-core communication uses the packet queues in `shared`.

#![no_std]
#![no_main]

use esp_bootloader_esp_idf::esp_app_desc;
esp_app_desc!();

mod core0;
mod core1;
mod shared;

extern crate alloc;

use alloc::boxed::Box;
use core::cell::RefCell;
use core::mem::MaybeUninit;
use critical_section::Mutex;
use esp_alloc as _;
use esp_hal::{
    analog::adc::{Adc, AdcConfig, Attenuation},
    clock::CpuClock,
    gpio::{Input, InputConfig, Pull},
    interrupt::software::SoftwareInterruptControl,
    main,
    system::Stack,
    time::Duration,
    timer::timg::{TimerGroup, Wdt},
};
use esp_println::logger::init_logger;
use esp_radio::esp_now::EspNow;
use esp_radio::wifi::Config as WifiConfig;

use crate::core0::FootSensors;

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
    init_logger(log::LevelFilter::Info);
    log::info!("Cadence sensor node starting...");

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

    // Pressure sensors on ADC1 (GPIO34 = right foot, GPIO35 = left foot)
    let mut adc_config = AdcConfig::new();
    let right = adc_config.enable_pin(peripherals.GPIO34, Attenuation::_11dB);
    let left = adc_config.enable_pin(peripherals.GPIO35, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_config);
    let sensors = FootSensors { adc, right, left };

    // Tempo buttons, active-low with pull-ups (GPIO25 = up, GPIO26 = down)
    let input_config = InputConfig::default().with_pull(Pull::Up);
    let btn_up = Input::new(peripherals.GPIO25, input_config);
    let btn_down = Input::new(peripherals.GPIO26, input_config);

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

    // Core 0 main loop: sensing
    core0::run(sensors, btn_up, btn_down);
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
