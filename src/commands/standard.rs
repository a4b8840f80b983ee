//! The standard command table.
//!
//! Targets name a runtime capability alias (`graphics`, `input`, `audio`,
//! `files`, `math`, `strings`) or the runtime root (`rt`) for timing and
//! program control. Handles (images, sounds, files, timers) are opaque
//! runtime objects and are typed `Unknown`.

use super::{ArgTransform, CommandDescriptor as D, CommandTable, Device};
use crate::semantic::ValueType;

const N: ValueType = ValueType::Number;
const S: ValueType = ValueType::String;
const B: ValueType = ValueType::Boolean;
const U: ValueType = ValueType::Unknown;

fn default(index: usize, value: &str) -> ArgTransform {
    ArgTransform::Default {
        index,
        value: value.to_string(),
    }
}

fn flag(index: usize) -> ArgTransform {
    ArgTransform::BooleanCoerce { index }
}

fn key(index: usize) -> ArgTransform {
    ArgTransform::DeviceCode {
        index,
        device: Device::Keyboard,
    }
}

fn button(index: usize) -> ArgTransform {
    ArgTransform::DeviceCode {
        index,
        device: Device::Mouse,
    }
}

pub(super) fn build() -> CommandTable {
    let mut table = CommandTable::empty();
    let mut add = |name: &str, descriptor: D| {
        table.insert(name, descriptor);
    };

    // ==================== Graphics ====================
    add("graphics", D::call("graphics.setMode").params([N, N, N, N]));
    add("endgraphics", D::call("graphics.endGraphics"));
    add("cls", D::call("graphics.cls"));
    add("clscolor", D::call("graphics.clsColor").params([N, N, N]));
    add("color", D::call("graphics.color").params([N, N, N]));
    add(
        "flip",
        D::call("graphics.flip")
            .params([N])
            .transform(default(0, "1"))
            .transform(flag(0))
            .suspending(),
    );
    add("setbuffer", D::call("graphics.setBuffer").params([U]));
    add("backbuffer", D::call("graphics.backBuffer"));
    add("frontbuffer", D::call("graphics.frontBuffer"));
    add("plot", D::call("graphics.plot").params([N, N]));
    add("line", D::call("graphics.line").params([N, N, N, N]));
    add(
        "rect",
        D::call("graphics.rect")
            .params([N, N, N, N, N])
            .transform(default(4, "1"))
            .transform(flag(4)),
    );
    add(
        "oval",
        D::call("graphics.oval")
            .params([N, N, N, N, N])
            .transform(default(4, "1"))
            .transform(flag(4)),
    );
    add(
        "text",
        D::call("graphics.text")
            .params([N, N, U, N, N])
            .transform(default(3, "0"))
            .transform(default(4, "0"))
            .transform(flag(3))
            .transform(flag(4)),
    );
    add("print", D::call("graphics.print").params([U]));
    add("write", D::call("graphics.write").params([U]));
    add("locate", D::call("graphics.locate").params([N, N]));
    add("origin", D::call("graphics.origin").params([N, N]));
    add("viewport", D::call("graphics.viewport").params([N, N, N, N]));
    add("graphicswidth", D::property("graphics.width").returns(N));
    add("graphicsheight", D::property("graphics.height").returns(N));
    add("colorred", D::call("graphics.colorRed").returns(N));
    add("colorgreen", D::call("graphics.colorGreen").returns(N));
    add("colorblue", D::call("graphics.colorBlue").returns(N));
    add("lockbuffer", D::unsupported());
    add("unlockbuffer", D::unsupported());

    // Images
    add(
        "loadimage",
        D::call("graphics.loadImage").params([S]).returns(U).suspending(),
    );
    add(
        "loadanimimage",
        D::call("graphics.loadAnimImage")
            .params([S, N, N, N, N])
            .returns(U)
            .suspending(),
    );
    add("createimage", D::call("graphics.createImage").params([N, N, N]).returns(U));
    add("freeimage", D::call("graphics.freeImage").params([U]));
    add(
        "drawimage",
        D::call("graphics.drawImage")
            .params([U, N, N, N])
            .transform(default(3, "0")),
    );
    add(
        "drawblock",
        D::call("graphics.drawBlock")
            .params([U, N, N, N])
            .transform(default(3, "0")),
    );
    add(
        "tileimage",
        D::call("graphics.tileImage")
            .params([U, N, N, N])
            .transform(default(1, "0"))
            .transform(default(2, "0"))
            .transform(default(3, "0")),
    );
    add("maskimage", D::call("graphics.maskImage").params([U, N, N, N]));
    add("midhandle", D::call("graphics.midHandle").params([U]));
    add("handleimage", D::call("graphics.handleImage").params([U, N, N]));
    add("automidhandle", D::call("graphics.autoMidHandle").params([N]).transform(flag(0)));
    add("imagewidth", D::call("graphics.imageWidth").params([U]).returns(N));
    add("imageheight", D::call("graphics.imageHeight").params([U]).returns(N));
    add(
        "imagescollide",
        D::call("graphics.imagesCollide")
            .params([U, N, N, N, U, N, N, N])
            .returns(B),
    );
    add(
        "rectsoverlap",
        D::call("graphics.rectsOverlap")
            .params([N, N, N, N, N, N, N, N])
            .returns(B),
    );

    // Fonts
    add(
        "loadfont",
        D::call("graphics.loadFont")
            .params([S, N, N, N, N])
            .returns(U)
            .suspending(),
    );
    add("setfont", D::call("graphics.setFont").params([U]));
    add("stringwidth", D::call("graphics.stringWidth").params([S]).returns(N));
    add("stringheight", D::call("graphics.stringHeight").params([S]).returns(N));

    // ==================== Input ====================
    add("keydown", D::call("input.keyDown").params([N]).returns(B).transform(key(0)));
    add("keyhit", D::call("input.keyHit").params([N]).returns(N).transform(key(0)));
    add("getkey", D::call("input.getKey").returns(N));
    add("waitkey", D::call("input.waitKey").returns(N).suspending());
    add("flushkeys", D::call("input.flushKeys"));
    add("mousex", D::property("input.mouseX").returns(N));
    add("mousey", D::property("input.mouseY").returns(N));
    add("mousez", D::property("input.mouseZ").returns(N));
    add(
        "mousedown",
        D::call("input.mouseDown").params([N]).returns(B).transform(button(0)),
    );
    add(
        "mousehit",
        D::call("input.mouseHit").params([N]).returns(N).transform(button(0)),
    );
    add("waitmouse", D::call("input.waitMouse").returns(N).suspending());
    add("flushmouse", D::call("input.flushMouse"));
    add("movemouse", D::call("input.moveMouse").params([N, N]));
    add("hidepointer", D::call("input.hidePointer"));
    add("showpointer", D::call("input.showPointer"));
    add(
        "input",
        D::call("input.readLine")
            .params([S])
            .returns(S)
            .transform(default(0, "\"\""))
            .suspending(),
    );

    // ==================== Audio ====================
    add(
        "loadsound",
        D::call("audio.loadSound").params([S]).returns(U).suspending(),
    );
    add("playsound", D::call("audio.playSound").params([U]).returns(U));
    add("playmusic", D::call("audio.playMusic").params([S]).returns(U));
    add("stopchannel", D::call("audio.stopChannel").params([U]));
    add("pausechannel", D::call("audio.pauseChannel").params([U]));
    add("resumechannel", D::call("audio.resumeChannel").params([U]));
    add("channelplaying", D::call("audio.channelPlaying").params([U]).returns(B));
    add("channelvolume", D::call("audio.channelVolume").params([U, N]));
    add("soundvolume", D::call("audio.soundVolume").params([U, N]));
    add("loopsound", D::call("audio.loopSound").params([U]));
    add("freesound", D::call("audio.freeSound").params([U]));

    // ==================== Files ====================
    add("readfile", D::call("files.readFile").params([S]).returns(U).suspending());
    add("openfile", D::call("files.openFile").params([S]).returns(U).suspending());
    add("writefile", D::call("files.writeFile").params([S]).returns(U));
    add("closefile", D::call("files.closeFile").params([U]));
    add("readline", D::call("files.readLine").params([U]).returns(S));
    add("readint", D::call("files.readInt").params([U]).returns(N));
    add("readfloat", D::call("files.readFloat").params([U]).returns(N));
    add("readstring", D::call("files.readString").params([U]).returns(S));
    add("writeline", D::call("files.writeLine").params([U, S]));
    add("writeint", D::call("files.writeInt").params([U, N]));
    add("writefloat", D::call("files.writeFloat").params([U, N]));
    add("writestring", D::call("files.writeString").params([U, S]));
    add("eof", D::call("files.eof").params([U]).returns(B));
    add("filetype", D::call("files.fileType").params([S]).returns(N));

    // ==================== Math ====================
    add("abs", D::inline("Math.abs({0})").params([N]).returns(N));
    add("sgn", D::inline("Math.sign({0})").params([N]).returns(N));
    add("sqr", D::inline("Math.sqrt({0})").params([N]).returns(N));
    add("floor", D::inline("Math.floor({0})").params([N]).returns(N));
    add("ceil", D::inline("Math.ceil({0})").params([N]).returns(N));
    add("int", D::inline("Math.round({0})").params([U]).returns(N));
    add("float", D::inline("Number({0})").params([U]).returns(N));
    add("exp", D::inline("Math.exp({0})").params([N]).returns(N));
    add("log", D::inline("Math.log({0})").params([N]).returns(N));
    add("log10", D::inline("Math.log10({0})").params([N]).returns(N));
    add("pi", D::property("math.pi").returns(N));
    // Trigonometry works in degrees
    add("sin", D::call("math.sin").params([N]).returns(N));
    add("cos", D::call("math.cos").params([N]).returns(N));
    add("tan", D::call("math.tan").params([N]).returns(N));
    add("asin", D::call("math.asin").params([N]).returns(N));
    add("acos", D::call("math.acos").params([N]).returns(N));
    add("atan", D::call("math.atan").params([N]).returns(N));
    add("atan2", D::call("math.atan2").params([N, N]).returns(N));
    add("rnd", D::call("math.rnd").params([N, N]).returns(N));
    add("rand", D::call("math.rand").params([N, N]).returns(N));
    add("seedrnd", D::call("math.seed").params([N]));

    // ==================== Strings ====================
    add("str", D::inline("String({0})").params([U]).returns(S));
    add("len", D::inline("String({0}).length").params([S]).returns(N));
    add("upper", D::inline("String({0}).toUpperCase()").params([S]).returns(S));
    add("lower", D::inline("String({0}).toLowerCase()").params([S]).returns(S));
    add("trim", D::inline("String({0}).trim()").params([S]).returns(S));
    add("chr", D::inline("String.fromCharCode({0})").params([N]).returns(S));
    add("string", D::inline("String({0}).repeat({1})").params([U, N]).returns(S));
    add("left", D::call("strings.left").params([S, N]).returns(S));
    add("right", D::call("strings.right").params([S, N]).returns(S));
    add(
        "mid",
        D::call("strings.mid")
            .params([S, N, N])
            .returns(S)
            .transform(default(2, "-1")),
    );
    add(
        "instr",
        D::call("strings.instr")
            .params([S, S, N])
            .returns(N)
            .transform(default(2, "1")),
    );
    add("replace", D::call("strings.replace").params([S, S, S]).returns(S));
    add("asc", D::call("strings.asc").params([S]).returns(N));
    add("hex", D::call("strings.hex").params([N]).returns(S));
    add("bin", D::call("strings.bin").params([N]).returns(S));
    add("lset", D::call("strings.lset").params([S, N]).returns(S));
    add("rset", D::call("strings.rset").params([S, N]).returns(S));

    // ==================== Timing ====================
    add("millisecs", D::call("rt.millisecs").returns(N));
    add("delay", D::call("rt.delay").params([N]).suspending());
    add("createtimer", D::call("rt.createTimer").params([N]).returns(U));
    add("waittimer", D::call("rt.waitTimer").params([U]).returns(N).suspending());
    add("freetimer", D::call("rt.freeTimer").params([U]));
    add("currentdate", D::call("rt.currentDate").returns(S));
    add("currenttime", D::call("rt.currentTime").returns(S));

    // ==================== Program ====================
    add("apptitle", D::call("rt.setTitle").params([S, S]));
    add("runtimeerror", D::call("rt.error").params([S]));
    add("debuglog", D::inline("console.log({0})").params([U]));
    add("stop", D::unsupported());

    table
}
